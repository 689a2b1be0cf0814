use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;

use crate::{
    audit,
    config::AppConfig,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::users::{self, Entity as Users},
    error::{AppError, AppResult},
    models::{User, UserRole},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Sign a bearer token. The `isAdmin` flag wins over the stored role.
pub fn issue_token(config: &AppConfig, user: &User) -> AppResult<String> {
    let role = if user.is_admin {
        UserRole::Admin
    } else {
        user.role
    };
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let new_user = payload.validate()?;

    let taken = Users::find()
        .filter(users::Column::Username.eq(new_user.username.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("Username is already taken".into()));
    }

    let active = users::ActiveModel {
        id: NotSet,
        username: Set(new_user.username),
        password_hash: Set(hash_password(&new_user.password)?),
        role: Set(UserRole::Customer.as_str().to_string()),
        is_admin: Set(false),
        shop_name: Set(None),
        shop_address: Set(None),
        maps_link: Set(None),
        created_at: NotSet,
    };
    let user = User::from(active.insert(&state.orm).await?);

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        json!({ "user_id": user.id }),
    )
    .await;
    tracing::info!(user_id = user.id, "user registered");

    Ok(ApiResponse::success("User created", user, Some(Meta::empty())))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let invalid = || AppError::Unauthorized("Invalid username or password".into());

    let model = Users::find()
        .filter(users::Column::Username.eq(username.trim()))
        .one(&state.orm)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&password, &model.password_hash)? {
        return Err(invalid());
    }

    let user = User::from(model);
    let token = issue_token(&state.config, &user)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { user, token },
        Some(Meta::empty()),
    ))
}
