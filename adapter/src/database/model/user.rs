use kernel::model::{id::UserId, user::User};

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub member_code: String,
    pub user_name: String,
    pub email: String,
    pub faculty: String,
    pub major: String,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let UserRow {
            user_id,
            member_code,
            user_name,
            email,
            faculty,
            major,
        } = value;
        User {
            user_id,
            member_code,
            user_name,
            email,
            faculty,
            major,
        }
    }
}
