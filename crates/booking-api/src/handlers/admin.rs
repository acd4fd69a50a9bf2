//! 管理侧 HTTP 处理器
//!
//! 运营后台：用户管理、课程场次与通卡目录维护、已签发通卡的
//! 人工干预。写操作直接走连接池事务，不经过预约引擎。

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use booking_engine::BookingError;
use booking_engine::models::{
    ClassSession, ClassSessionWithCount, PassType, UserPassStatus, UserPassWithType,
};
use booking_engine::repository::UserPassRepository;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    AdjustCreditsRequest, ApiResponse, CreateClassSessionRequest, CreatePassTypeRequest,
    SetUserDisabledRequest, SetUserRoleRequest, UserDto,
};
use crate::error::{ApiError, Result};
use crate::state::AppState;

// ==================== 用户管理 ====================

/// 列出全部用户
#[instrument(skip(state, _claims))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>> {
    let users = sqlx::query_as::<_, UserDto>(
        r#"
        SELECT id, email, name, role, disabled, created_at
        FROM users
        ORDER BY id ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(users)))
}

/// 停用 / 启用用户
///
/// 管理员不能停用自己的账号
#[instrument(skip(state, claims, req))]
pub async fn set_user_disabled(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
    Json(req): Json<SetUserDisabledRequest>,
) -> Result<Json<ApiResponse<UserDto>>> {
    if claims.user_id()? == user_id {
        return Err(ApiError::Forbidden("不能停用自己的账号".to_string()));
    }

    let user = sqlx::query_as::<_, UserDto>(
        r#"
        UPDATE users
        SET disabled = $2
        WHERE id = $1
        RETURNING id, email, name, role, disabled, created_at
        "#,
    )
    .bind(user_id)
    .bind(req.disabled)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::UserNotFound(user_id))?;

    info!(user_id, disabled = req.disabled, "user disabled flag updated");
    Ok(Json(ApiResponse::success(user)))
}

/// 调整用户角色
///
/// 管理员不能修改自己的角色，避免把最后一个管理员降级
#[instrument(skip(state, claims, req))]
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
    Json(req): Json<SetUserRoleRequest>,
) -> Result<Json<ApiResponse<UserDto>>> {
    if req.role != "member" && req.role != "admin" {
        return Err(ApiError::Validation(format!(
            "角色必须是 member 或 admin: {}",
            req.role
        )));
    }
    if claims.user_id()? == user_id {
        return Err(ApiError::Forbidden("不能修改自己的角色".to_string()));
    }

    let user = sqlx::query_as::<_, UserDto>(
        r#"
        UPDATE users
        SET role = $2
        WHERE id = $1
        RETURNING id, email, name, role, disabled, created_at
        "#,
    )
    .bind(user_id)
    .bind(&req.role)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::UserNotFound(user_id))?;

    info!(user_id, role = %req.role, "user role updated");
    Ok(Json(ApiResponse::success(user)))
}

/// 查看某个用户的全部通卡
#[instrument(skip(state, _claims))]
pub async fn list_user_passes(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<UserPassWithType>>>> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;
    if !exists.0 {
        return Err(ApiError::UserNotFound(user_id));
    }

    let passes = sqlx::query_as::<_, UserPassWithType>(
        r#"
        SELECT up.id, up.user_id, up.pass_type_id, up.starts_at, up.expires_at,
               up.remaining_credits, up.status, up.created_at,
               pt.name, pt.kind, pt.credits, pt.duration_days,
               pt.active AS type_active
        FROM user_passes up
        JOIN pass_types pt ON pt.id = up.pass_type_id
        WHERE up.user_id = $1
        ORDER BY up.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(passes)))
}

// ==================== 课程场次管理 ====================

/// 创建课程场次
#[instrument(skip(state, _claims, req))]
pub async fn create_class_session(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<CreateClassSessionRequest>,
) -> Result<Json<ApiResponse<ClassSession>>> {
    req.validate()?;
    if req.ends_at <= req.starts_at {
        return Err(ApiError::Validation(
            "结束时间必须晚于开始时间".to_string(),
        ));
    }

    let session = sqlx::query_as::<_, ClassSession>(
        r#"
        INSERT INTO class_sessions (title, description, starts_at, ends_at,
                                    capacity, location, instructor, active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
        RETURNING id, title, description, starts_at, ends_at, capacity,
                  location, instructor, active, created_at
        "#,
    )
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(req.starts_at)
    .bind(req.ends_at)
    .bind(req.capacity)
    .bind(&req.location)
    .bind(&req.instructor)
    .fetch_one(&state.pool)
    .await?;

    info!(class_session_id = session.id, "class session created");
    Ok(Json(ApiResponse::success(session)))
}

/// 列出全部场次（含已下架和历史场次）
#[instrument(skip(state, _claims))]
pub async fn list_class_sessions(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<ClassSessionWithCount>>>> {
    let sessions = sqlx::query_as::<_, ClassSessionWithCount>(
        r#"
        SELECT cs.id, cs.title, cs.description, cs.starts_at, cs.ends_at,
               cs.capacity, cs.location, cs.instructor, cs.active,
               COUNT(b.id) FILTER (WHERE b.status = 'booked') AS booked_count
        FROM class_sessions cs
        LEFT JOIN bookings b ON b.class_session_id = cs.id
        GROUP BY cs.id
        ORDER BY cs.starts_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(sessions)))
}

// ==================== 通卡目录管理 ====================

/// 创建通卡类型
///
/// kind 非法 → invalid_pass_kind；次卡必须带正点数，
/// 订阅的 credits 强制为 NULL
#[instrument(skip(state, _claims, req))]
pub async fn create_pass_type(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<CreatePassTypeRequest>,
) -> Result<Json<ApiResponse<PassType>>> {
    req.validate()?;

    if req.kind != "subscription" && req.kind != "pack" {
        return Err(BookingError::InvalidPassKind(req.kind).into());
    }
    if req.duration_days <= 0 {
        return Err(BookingError::InvalidDurationDays(req.duration_days).into());
    }
    let credits = if req.kind == "pack" {
        match req.credits {
            Some(c) if c > 0 => Some(c),
            other => return Err(BookingError::InvalidPackCredits(other.unwrap_or(0)).into()),
        }
    } else {
        None
    };

    let pass_type = sqlx::query_as::<_, PassType>(
        r#"
        INSERT INTO pass_types (name, kind, credits, duration_days, active)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING id, name, kind, credits, duration_days, active, created_at
        "#,
    )
    .bind(req.name.trim())
    .bind(&req.kind)
    .bind(credits)
    .bind(req.duration_days)
    .fetch_one(&state.pool)
    .await?;

    info!(pass_type_id = pass_type.id, kind = %req.kind, "pass type created");
    Ok(Json(ApiResponse::success(pass_type)))
}

/// 列出全部通卡类型（含已下架）
#[instrument(skip(state, _claims))]
pub async fn list_pass_types(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<PassType>>>> {
    let pass_types = sqlx::query_as::<_, PassType>(
        r#"
        SELECT id, name, kind, credits, duration_days, active, created_at
        FROM pass_types
        ORDER BY id ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(pass_types)))
}

// ==================== 已签发通卡管理 ====================

/// 已签发通卡行（管理视图，含种类）
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct AdminPassRow {
    pub id: i64,
    pub user_id: i64,
    pub pass_type_id: i64,
    pub remaining_credits: Option<i32>,
    pub status: String,
    pub kind: String,
}

/// 人工调整次卡点数
///
/// delta 与 set_to 二选一；结果不允许为负。客服补偿与纠错入口，
/// 走 FOR UPDATE 锁避免与预约扣减交错。
#[instrument(skip(state, _claims, req))]
pub async fn adjust_pass_credits(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Path(pass_id): Path<i64>,
    Json(req): Json<AdjustCreditsRequest>,
) -> Result<Json<ApiResponse<AdminPassRow>>> {
    let adjustment = match (req.delta, req.set_to) {
        (Some(delta), None) => Adjustment::Delta(delta),
        (None, Some(set_to)) => Adjustment::SetTo(set_to),
        _ => {
            return Err(ApiError::Validation(
                "delta 与 set_to 必须二选一".to_string(),
            ));
        }
    };

    let mut tx = state.pool.begin().await?;

    let pass = sqlx::query_as::<_, AdminPassRow>(
        r#"
        SELECT up.id, up.user_id, up.pass_type_id, up.remaining_credits,
               up.status, pt.kind
        FROM user_passes up
        JOIN pass_types pt ON pt.id = up.pass_type_id
        WHERE up.id = $1
        FOR UPDATE OF up
        "#,
    )
    .bind(pass_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(BookingError::PassNotFound(pass_id))?;

    if pass.kind != "pack" {
        return Err(ApiError::Validation("只能调整次卡的点数".to_string()));
    }

    let new_credits = match adjustment {
        Adjustment::Delta(delta) => pass.remaining_credits.unwrap_or(0) + delta,
        Adjustment::SetTo(set_to) => set_to,
    };
    if new_credits < 0 {
        return Err(ApiError::Validation(format!(
            "调整后点数不能为负: {new_credits}"
        )));
    }

    sqlx::query("UPDATE user_passes SET remaining_credits = $2 WHERE id = $1")
        .bind(pass_id)
        .bind(new_credits)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(pass_id, new_credits, "pass credits adjusted");
    Ok(Json(ApiResponse::success(AdminPassRow {
        remaining_credits: Some(new_credits),
        ..pass
    })))
}

enum Adjustment {
    Delta(i32),
    SetTo(i32),
}

/// 作废已签发的通卡
///
/// 幂等操作：已是 cancelled 的通卡重复作废直接返回成功
#[instrument(skip(state, _claims))]
pub async fn cancel_pass(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Path(pass_id): Path<i64>,
) -> Result<Json<ApiResponse<AdminPassRow>>> {
    let mut tx = state.pool.begin().await?;

    let pass = sqlx::query_as::<_, AdminPassRow>(
        r#"
        SELECT up.id, up.user_id, up.pass_type_id, up.remaining_credits,
               up.status, pt.kind
        FROM user_passes up
        JOIN pass_types pt ON pt.id = up.pass_type_id
        WHERE up.id = $1
        FOR UPDATE OF up
        "#,
    )
    .bind(pass_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(BookingError::PassNotFound(pass_id))?;

    UserPassRepository::set_status_in_tx(&mut tx, pass_id, UserPassStatus::Cancelled).await?;
    tx.commit().await?;

    info!(pass_id, "pass cancelled by admin");
    Ok(Json(ApiResponse::success(AdminPassRow {
        status: "cancelled".to_string(),
        ..pass
    })))
}
