//! 认证相关的 HTTP 处理器
//!
//! 注册、登录与获取当前用户

use axum::{Extension, Json, extract::State};
use sqlx::FromRow;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::{Claims, hash_password, verify_password};
use crate::dto::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest, UserDto};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 用户行（含密码哈希，仅认证内部使用）
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    name: String,
    role: String,
    disabled: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl UserRow {
    fn into_dto(self) -> UserDto {
        UserDto {
            id: self.id,
            email: self.email,
            name: self.name,
            role: self.role,
            disabled: self.disabled,
            created_at: self.created_at,
        }
    }
}

/// 注册新会员
///
/// 邮箱全局唯一，注册即登录（返回 Token）
#[instrument(skip(state, req))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let password_hash = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, password_hash, name, role)
        VALUES ($1, $2, $3, 'member')
        RETURNING id, email, password_hash, name, role, disabled, created_at
        "#,
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(req.name.trim())
    .fetch_one(&state.pool)
    .await
    .map_err(|err| match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            ApiError::EmailAlreadyExists
        }
        _ => ApiError::Database(err),
    })?;

    info!(user_id = user.id, "member registered");
    issue_auth_response(&state, user)
}

/// 登录
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, password_hash, name, role, disabled, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    // 先验密码再判停用，避免通过响应差异探测账号是否存在
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }
    if user.disabled {
        return Err(ApiError::UserDisabled);
    }

    info!(user_id = user.id, "member logged in");
    issue_auth_response(&state, user)
}

/// 获取当前登录用户
#[instrument(skip(state, claims))]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserDto>>> {
    let user_id = claims.user_id()?;
    let user = sqlx::query_as::<_, UserDto>(
        r#"
        SELECT id, email, name, role, disabled, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::UserNotFound(user_id))?;

    // 停用后立即拒绝，不等已签发的 Token 自然过期
    if user.disabled {
        return Err(ApiError::UserDisabled);
    }

    Ok(Json(ApiResponse::success(user)))
}

fn issue_auth_response(
    state: &AppState,
    user: UserRow,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    let (token, expires_at) =
        state
            .jwt_manager
            .generate_token(user.id, &user.email, &user.name, &user.role)?;

    Ok(Json(ApiResponse::success(AuthResponse {
        token,
        user: user.into_dto(),
        expires_at,
    })))
}
