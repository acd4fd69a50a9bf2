//! 购买服务

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::conflict::{begin_serializable, retry_once_on_conflict};
use crate::error::{BookingError, Result};
use crate::models::{PassKind, UserPass};
use crate::repository::{PassTypeRepository, UserPassRepository};

/// 购买服务
pub struct PurchaseService {
    pool: PgPool,
}

impl PurchaseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 购买通卡
    ///
    /// 按目录项给用户签发一张通卡：
    /// 1. 目录项必须存在且在售 → pass_type_not_found / pass_type_inactive
    /// 2. 目录数据自检：有效期天数为正，次卡初始点数为正
    /// 3. 订阅唯一性：同类型已有有效订阅 → already_active_subscription
    ///    （SERIALIZABLE 下并发重复购买必有一方 40001 重试后在此被拒）
    /// 4. 签发：有效期从当下起算 duration_days 天，次卡带初始点数
    #[instrument(skip(self))]
    pub async fn purchase(&self, user_id: i64, pass_type_id: i64) -> Result<UserPass> {
        let pass = retry_once_on_conflict("purchase_pass", || {
            self.purchase_once(user_id, pass_type_id)
        })
        .await?;

        info!(
            user_id,
            pass_type_id,
            user_pass_id = pass.id,
            expires_at = %pass.expires_at,
            "pass purchased"
        );

        Ok(pass)
    }

    async fn purchase_once(&self, user_id: i64, pass_type_id: i64) -> Result<UserPass> {
        let mut tx = begin_serializable(&self.pool).await?;

        let pass_type = PassTypeRepository::get_by_id_in_tx(&mut tx, pass_type_id)
            .await?
            .ok_or(BookingError::PassTypeNotFound(pass_type_id))?;

        if !pass_type.active {
            return Err(BookingError::PassTypeInactive(pass_type_id));
        }
        if pass_type.duration_days <= 0 {
            return Err(BookingError::InvalidDurationDays(pass_type.duration_days));
        }

        let credits = match pass_type.kind {
            PassKind::Subscription => None,
            PassKind::Pack => match pass_type.credits {
                Some(c) if c > 0 => Some(c),
                other => return Err(BookingError::InvalidPackCredits(other.unwrap_or(0))),
            },
        };

        if pass_type.kind == PassKind::Subscription {
            let duplicated =
                UserPassRepository::has_active_subscription_in_tx(&mut tx, user_id, pass_type_id)
                    .await?;
            if duplicated {
                return Err(BookingError::AlreadyActiveSubscription(pass_type_id));
            }
        }

        let pass = UserPassRepository::create_in_tx(
            &mut tx,
            user_id,
            pass_type_id,
            credits,
            pass_type.duration_days,
        )
        .await?;

        tx.commit().await?;
        Ok(pass)
    }
}
