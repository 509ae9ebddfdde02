use kernel::model::{id::UserId, user::User};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub member_code: String,
    pub user_name: String,
    pub email: String,
    pub faculty: String,
    pub major: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            member_code,
            user_name,
            email,
            faculty,
            major,
        } = value;
        Self {
            user_id,
            member_code,
            user_name,
            email,
            faculty,
            major,
        }
    }
}
