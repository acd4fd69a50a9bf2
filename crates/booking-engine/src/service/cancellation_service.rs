//! 取消服务

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::conflict::{begin_serializable, retry_once_on_conflict};
use crate::error::{BookingError, Result};
use crate::models::{Booking, BookingStatus, PassKind};
use crate::repository::{BookingRepository, UserPassRepository};

/// 取消服务
pub struct CancellationService {
    pool: PgPool,
}

impl CancellationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 取消预约
    ///
    /// 预约单向迁移到 cancelled，次卡点数原路退回：
    /// 1. FOR UPDATE 锁定预约行（不存在或不属于该用户 → booking_not_found）
    /// 2. 已取消的预约拒绝再取消 → already_cancelled
    /// 3. 置为 cancelled，座位立即回到场次余量
    /// 4. 当初消耗的是次卡则退一个点；通卡状态和有效期不做校验，
    ///    点数是用户花出去的，卡过期了也照退
    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: i64, booking_id: i64) -> Result<Booking> {
        let booking = retry_once_on_conflict("cancel_booking", || {
            self.cancel_once(user_id, booking_id)
        })
        .await?;

        info!(
            user_id,
            booking_id,
            refunded_pass_id = ?booking.user_pass_id,
            "booking cancelled"
        );

        Ok(booking)
    }

    async fn cancel_once(&self, user_id: i64, booking_id: i64) -> Result<Booking> {
        let mut tx = begin_serializable(&self.pool).await?;

        let mut booking = BookingRepository::lock_by_id_in_tx(&mut tx, user_id, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled(booking_id));
        }

        BookingRepository::cancel_in_tx(&mut tx, booking_id).await?;
        booking.status = BookingStatus::Cancelled;

        if let Some(pass_id) = booking.user_pass_id {
            let candidate =
                UserPassRepository::lock_candidate_by_id(&mut tx, user_id, pass_id).await?;
            if let Some(candidate) = candidate {
                if candidate.kind == PassKind::Pack {
                    UserPassRepository::refund_credit_in_tx(&mut tx, pass_id).await?;
                }
            }
        }

        tx.commit().await?;
        Ok(booking)
    }
}
