use crate::model::user::User;
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_code(&self, member_code: &str) -> AppResult<Option<User>>;
    // 見つかったユーザーのみ返す。欠けたコードの検出は呼び出し側で行う
    async fn find_by_codes(&self, member_codes: &[String]) -> AppResult<Vec<User>>;
}
