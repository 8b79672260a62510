use serde::{Deserialize, Serialize};
use time::Date;

use crate::store::User;

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// Read-facing projection of a roster record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRead {
    pub id: i64,
    pub forename: String,
    pub surname: String,
    pub email: String,
    pub is_active: bool,
    #[serde(with = "date_format")]
    pub date_of_birth: Date,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            forename: user.forename,
            surname: user.surname,
            email: user.email,
            is_active: user.is_active,
            date_of_birth: user.date_of_birth,
        }
    }
}

/// Caller-supplied fields for create and update. `id` correlates an update
/// to its target and must be absent on create; `by` names the acting user
/// for the audit trail.
#[derive(Debug, Clone, Deserialize)]
pub struct UserWrite {
    pub id: Option<i64>,
    pub forename: String,
    pub surname: String,
    pub email: String,
    pub is_active: bool,
    #[serde(with = "date_format")]
    pub date_of_birth: Date,
    // TODO: populate from the authenticated user once auth lands
    #[serde(default = "default_actor")]
    pub by: String,
}

fn default_actor() -> String {
    "System".into()
}

#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserFilter {
    Active,
    Inactive,
    All,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub filter: Option<UserFilter>,
}
