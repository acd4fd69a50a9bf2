//! 预约服务
//!
//! 预约是整个系统的核心事务，同时面对两种竞争：同场次抢容量、
//! 同通卡抢点数。锁序固定为「先场次、后通卡」，避免与取消事务
//! 形成交叉死锁。

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::conflict::{begin_serializable, retry_once_on_conflict};
use crate::error::{BookingError, Result};
use crate::models::{Booking, PassCandidate, PassKind};
use crate::repository::{BookingRepository, ClassSessionRepository, UserPassRepository};
use crate::selector::select_pass;

/// 预约服务
pub struct BookingService {
    pool: PgPool,
}

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 预约课程场次
    ///
    /// 消耗一张通卡换取一个座位，全程单事务：
    /// 1. FOR UPDATE 锁定场次行（不存在或已下架 → class_not_found）
    /// 2. 在锁内统计 booked 数，达到容量 → class_full
    /// 3. 锁定候选通卡并选卡（无可用 → no_active_pass）
    /// 4. 次卡做受保护扣减（扣不动 → no_credits）
    /// 5. 插入预约，部分唯一索引兜底重复预约
    ///
    /// 序列化冲突时整个事务重试一次。
    #[instrument(skip(self))]
    pub async fn book(
        &self,
        user_id: i64,
        class_session_id: i64,
        requested_pass_id: Option<i64>,
    ) -> Result<Booking> {
        let booking = retry_once_on_conflict("book_class", || {
            self.book_once(user_id, class_session_id, requested_pass_id)
        })
        .await?;

        info!(
            user_id,
            class_session_id,
            booking_id = booking.id,
            user_pass_id = ?booking.user_pass_id,
            "class booked"
        );

        Ok(booking)
    }

    async fn book_once(
        &self,
        user_id: i64,
        class_session_id: i64,
        requested_pass_id: Option<i64>,
    ) -> Result<Booking> {
        let mut tx = begin_serializable(&self.pool).await?;

        let session = ClassSessionRepository::lock_active_session(&mut tx, class_session_id)
            .await?
            .ok_or(BookingError::ClassNotFound(class_session_id))?;

        let booked = BookingRepository::count_booked_in_tx(&mut tx, class_session_id).await?;
        if booked >= i64::from(session.capacity) {
            return Err(BookingError::ClassFull(class_session_id));
        }

        let now = Utc::now();
        // 显式指定通卡时只锁那一张，自动选卡时锁整个可用集合
        let candidates: Vec<PassCandidate> = match requested_pass_id {
            Some(pass_id) => {
                UserPassRepository::lock_candidate_by_id(&mut tx, user_id, pass_id)
                    .await?
                    .into_iter()
                    .collect()
            }
            None => UserPassRepository::lock_usable_candidates(&mut tx, user_id, now).await?,
        };
        let selected = select_pass(&candidates, requested_pass_id, now)?;

        if selected.kind == PassKind::Pack {
            let decremented =
                UserPassRepository::decrement_credit_in_tx(&mut tx, selected.id).await?;
            if !decremented {
                return Err(BookingError::NoCredits(selected.id));
            }
        }

        let booking =
            BookingRepository::create_in_tx(&mut tx, user_id, class_session_id, selected.id)
                .await?;

        tx.commit().await?;
        Ok(booking)
    }
}
