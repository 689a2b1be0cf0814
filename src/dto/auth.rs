use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::User,
};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

pub struct NewUser {
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> AppResult<NewUser> {
        let username = self.username.trim().to_string();
        if username.len() < 3 || username.len() > 64 {
            return Err(AppError::BadRequest(
                "username must be between 3 and 64 characters".into(),
            ));
        }
        if self.password.len() < 6 {
            return Err(AppError::BadRequest(
                "password must be at least 6 characters".into(),
            ));
        }
        Ok(NewUser {
            username,
            password: self.password,
        })
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_trims_username_and_checks_lengths() {
        let ok = RegisterRequest {
            username: "  ravi ".into(),
            password: "secret1".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.username, "ravi");

        assert!(RegisterRequest {
            username: "ab".into(),
            password: "secret1".into(),
        }
        .validate()
        .is_err());

        assert!(RegisterRequest {
            username: "ravi".into(),
            password: "123".into(),
        }
        .validate()
        .is_err());
    }
}
