//! 查询服务
//!
//! 读路径不开显式事务。用户视角的读操作进来时先做一次懒惰过期，
//! 保证返回的数据里不会出现名义 active 实际已过期的通卡。

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::error::{BookingError, Result};
use crate::models::{
    BookingWithSession, ClassSessionWithCount, PassCandidate, PassType, UserPassWithType,
};
use crate::repository::{
    BookingRepository, ClassSessionRepository, PassTypeRepository, UserPassRepository,
};
use crate::selector::select_pass;

/// 查询服务
pub struct QueryService {
    class_sessions: ClassSessionRepository,
    pass_types: PassTypeRepository,
    user_passes: UserPassRepository,
    bookings: BookingRepository,
}

impl QueryService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            class_sessions: ClassSessionRepository::new(pool.clone()),
            pass_types: PassTypeRepository::new(pool.clone()),
            user_passes: UserPassRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool),
        }
    }

    /// 列出可预约的未来场次（带余量）
    #[instrument(skip(self))]
    pub async fn list_upcoming_classes(&self) -> Result<Vec<ClassSessionWithCount>> {
        self.class_sessions.list_upcoming().await
    }

    /// 列出在售的通卡类型
    #[instrument(skip(self))]
    pub async fn list_pass_types(&self) -> Result<Vec<PassType>> {
        self.pass_types.list_active().await
    }

    /// 我的通卡（先收敛过期状态）
    #[instrument(skip(self))]
    pub async fn my_passes(&self, user_id: i64) -> Result<Vec<UserPassWithType>> {
        let expired = self.user_passes.expire_overdue(user_id).await?;
        if expired > 0 {
            debug!(user_id, expired, "lazily expired overdue passes");
        }
        self.user_passes.list_with_type(user_id).await
    }

    /// 预览自动选卡会选中的通卡
    ///
    /// 与预约事务共用同一个选卡函数，但不加锁；返回 None 表示
    /// 此刻没有可用通卡。预览结果不构成预留。
    #[instrument(skip(self))]
    pub async fn current_pass(&self, user_id: i64) -> Result<Option<PassCandidate>> {
        self.user_passes.expire_overdue(user_id).await?;

        let now = Utc::now();
        let candidates = self.user_passes.list_usable_candidates(user_id, now).await?;
        match select_pass(&candidates, None, now) {
            Ok(selected) => Ok(Some(selected.clone())),
            Err(BookingError::NoActivePass) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// 我的预约（含场次信息）
    #[instrument(skip(self))]
    pub async fn my_bookings(&self, user_id: i64) -> Result<Vec<BookingWithSession>> {
        let expired = self.user_passes.expire_overdue(user_id).await?;
        if expired > 0 {
            debug!(user_id, expired, "lazily expired overdue passes");
        }
        self.bookings.list_with_session(user_id).await
    }
}
