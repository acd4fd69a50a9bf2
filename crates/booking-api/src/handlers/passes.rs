//! 通卡购买与查询处理器

use axum::{Extension, Json, extract::State};
use booking_engine::UserPass;
use booking_engine::models::{PassCandidate, PassType, UserPassWithType};
use tracing::instrument;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{ApiResponse, PurchasePassRequest};
use crate::error::Result;
use crate::state::AppState;

/// 列出在售的通卡类型（公开接口）
#[instrument(skip(state))]
pub async fn list_pass_types(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PassType>>>> {
    let pass_types = state.query_service.list_pass_types().await?;
    Ok(Json(ApiResponse::success(pass_types)))
}

/// 购买通卡
#[instrument(skip(state, claims))]
pub async fn purchase_pass(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PurchasePassRequest>,
) -> Result<Json<ApiResponse<UserPass>>> {
    req.validate()?;
    let user_id = claims.user_id()?;

    let pass = state
        .purchase_service
        .purchase(user_id, req.pass_type_id)
        .await?;
    Ok(Json(ApiResponse::success(pass)))
}

/// 预览自动选卡结果（data 为 null 表示没有可用通卡）
#[instrument(skip(state, claims))]
pub async fn current_pass(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Option<PassCandidate>>>> {
    let user_id = claims.user_id()?;
    let pass = state.query_service.current_pass(user_id).await?;
    Ok(Json(ApiResponse::success(pass)))
}

/// 我的通卡
#[instrument(skip(state, claims))]
pub async fn my_passes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<UserPassWithType>>>> {
    let user_id = claims.user_id()?;
    let passes = state.query_service.my_passes(user_id).await?;
    Ok(Json(ApiResponse::success(passes)))
}
