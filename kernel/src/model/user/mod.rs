use crate::model::id::UserId;

// 予約の参加者はメンバーコード（短い会員番号）で指定される。
// faculty / major は表示専用の属性で、このコアでは解釈しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub member_code: String,
    pub user_name: String,
    pub email: String,
    pub faculty: String,
    pub major: String,
}
