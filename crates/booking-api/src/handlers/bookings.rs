//! 预约与取消处理器

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use booking_engine::models::BookingWithSession;
use booking_engine::{Booking, BookingError};
use tracing::instrument;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{ApiResponse, BookClassRequest};
use crate::error::Result;
use crate::state::AppState;

/// 预约课程场次
#[instrument(skip(state, claims))]
pub async fn book_class(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BookClassRequest>,
) -> Result<Json<ApiResponse<Booking>>> {
    req.validate()?;
    if matches!(req.user_pass_id, Some(id) if id <= 0) {
        return Err(BookingError::InvalidUserPassId.into());
    }
    let user_id = claims.user_id()?;

    let booking = state
        .booking_service
        .book(user_id, req.class_session_id, req.user_pass_id)
        .await?;
    Ok(Json(ApiResponse::success(booking)))
}

/// 取消预约
#[instrument(skip(state, claims))]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<Booking>>> {
    let user_id = claims.user_id()?;
    let booking = state
        .cancellation_service
        .cancel(user_id, booking_id)
        .await?;
    Ok(Json(ApiResponse::success(booking)))
}

/// 我的预约
#[instrument(skip(state, claims))]
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<BookingWithSession>>>> {
    let user_id = claims.user_id()?;
    let bookings = state.query_service.my_bookings(user_id).await?;
    Ok(Json(ApiResponse::success(bookings)))
}
