use serde::Deserialize;

use super::repo_types::{NewUser, UserChanges};

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for `PUT /users/:id`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// Query for `GET /users/lookup`.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            username: r.username,
            password: r.password,
            email: r.email,
        }
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            username: r.username,
            is_active: r.is_active,
            password: r.password,
        }
    }
}
