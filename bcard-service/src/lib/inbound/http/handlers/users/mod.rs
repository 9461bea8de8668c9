use auth::authorize;
use auth::Identity;
use auth::Requirement;
use serde::Serialize;

use super::ApiError;
use super::UserData;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

pub mod change_password;
pub mod current_user;
pub mod delete_user;
pub mod get_user;
pub mod list_users;
pub mod login;
pub mod register;
pub mod set_business_status;
pub mod update_user;

pub use change_password::change_password;
pub use current_user::current_user;
pub use delete_user::delete_user;
pub use get_user::get_user;
pub use list_users::list_users;
pub use login::login;
pub use register::register;
pub use set_business_status::set_business_status;
pub use update_user::update_user;

/// Parse the `:id` path segment and check the caller may act on it.
fn authorize_target(identity: &Identity, id: &str) -> Result<UserId, ApiError> {
    let user_id = UserId::from_string(id).map_err(UserError::from)?;
    authorize(
        Some(identity),
        &Requirement::OwnerOrAdmin(user_id.to_string()),
    )?;
    Ok(user_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub user: UserData,
    pub token: String,
}

impl From<&Session> for SessionData {
    fn from(session: &Session) -> Self {
        Self {
            user: (&session.user).into(),
            token: session.token.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListData {
    pub users: Vec<UserData>,
    pub count: usize,
}

impl From<&Vec<User>> for UserListData {
    fn from(users: &Vec<User>) -> Self {
        Self {
            users: users.iter().map(UserData::from).collect(),
            count: users.len(),
        }
    }
}
