//! 用户通卡仓储
//!
//! 预约事务在这里锁定候选通卡并做受保护扣减；购买事务在这里
//! 做订阅唯一性检查和签发。

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Row};

use crate::error::Result;
use crate::models::{PassCandidate, UserPass, UserPassStatus, UserPassWithType};

/// 用户通卡仓储
pub struct UserPassRepository {
    pool: PgPool,
}

impl UserPassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 列出用户的全部通卡（含目录信息），最近签发的在前
    pub async fn list_with_type(&self, user_id: i64) -> Result<Vec<UserPassWithType>> {
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
        .fetch_all(&self.pool)
        .await?;

        Ok(passes)
    }

    /// 列出用户此刻可用的候选通卡（只读，不加锁）
    ///
    /// 预览"当前会用哪张卡"用；预约事务必须用加锁变体
    pub async fn list_usable_candidates(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<PassCandidate>> {
        let candidates = sqlx::query_as::<_, PassCandidate>(
            r#"
            SELECT up.id, up.user_id, up.pass_type_id, up.starts_at,
                   up.expires_at, up.remaining_credits, up.status, pt.kind
            FROM user_passes up
            JOIN pass_types pt ON pt.id = up.pass_type_id
            WHERE up.user_id = $1
              AND up.status = 'active'
              AND up.expires_at > $2
              AND (pt.kind = 'subscription' OR COALESCE(up.remaining_credits, 0) > 0)
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    /// 懒惰过期：把该用户所有已越过 expires_at 的 active 通卡标记为 expired
    ///
    /// 没有后台任务，读路径进来时顺手收敛状态；返回受影响行数
    pub async fn expire_overdue(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_passes
            SET status = 'expired'
            WHERE user_id = $1 AND status = 'active' AND expires_at <= NOW()
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // ==================== 事务操作 ====================

    /// 在事务中锁定用户此刻可用的全部候选通卡
    ///
    /// FOR UPDATE OF up 只锁 user_passes 行，目录行不陪绑；
    /// 候选集在锁内取得，选卡决策之后不会被并发改动
    pub async fn lock_usable_candidates(
        tx: &mut PgConnection,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<PassCandidate>> {
        let candidates = sqlx::query_as::<_, PassCandidate>(
            r#"
            SELECT up.id, up.user_id, up.pass_type_id, up.starts_at,
                   up.expires_at, up.remaining_credits, up.status, pt.kind
            FROM user_passes up
            JOIN pass_types pt ON pt.id = up.pass_type_id
            WHERE up.user_id = $1
              AND up.status = 'active'
              AND up.expires_at > $2
              AND (pt.kind = 'subscription' OR COALESCE(up.remaining_credits, 0) > 0)
            FOR UPDATE OF up
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(tx)
        .await?;

        Ok(candidates)
    }

    /// 在事务中锁定用户指定的一张通卡
    ///
    /// 按 id + user_id 查，别人的通卡对调用方等同于不存在
    pub async fn lock_candidate_by_id(
        tx: &mut PgConnection,
        user_id: i64,
        pass_id: i64,
    ) -> Result<Option<PassCandidate>> {
        let candidate = sqlx::query_as::<_, PassCandidate>(
            r#"
            SELECT up.id, up.user_id, up.pass_type_id, up.starts_at,
                   up.expires_at, up.remaining_credits, up.status, pt.kind
            FROM user_passes up
            JOIN pass_types pt ON pt.id = up.pass_type_id
            WHERE up.id = $1 AND up.user_id = $2
            FOR UPDATE OF up
            "#,
        )
        .bind(pass_id)
        .bind(user_id)
        .fetch_optional(tx)
        .await?;

        Ok(candidate)
    }

    /// 在事务中扣减次卡点数（受保护扣减）
    ///
    /// WHERE remaining_credits > 0 是最后一道防线：即便调用方的
    /// 检查已经过时，点数也不可能被扣成负数。返回是否扣减成功。
    pub async fn decrement_credit_in_tx(tx: &mut PgConnection, pass_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_passes
            SET remaining_credits = remaining_credits - 1
            WHERE id = $1 AND remaining_credits > 0
            "#,
        )
        .bind(pass_id)
        .execute(tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 在事务中退回一个次卡点数
    ///
    /// 取消预约时调用。不校验通卡状态和有效期：点数是用户花出去
    /// 的，即便卡已过期也原样退回。
    pub async fn refund_credit_in_tx(tx: &mut PgConnection, pass_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_passes
            SET remaining_credits = COALESCE(remaining_credits, 0) + 1
            WHERE id = $1
            "#,
        )
        .bind(pass_id)
        .execute(tx)
        .await?;

        Ok(())
    }

    /// 在事务中检查用户是否已持有同类型的有效订阅
    pub async fn has_active_subscription_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
        pass_type_id: i64,
    ) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_passes
                WHERE user_id = $1
                  AND pass_type_id = $2
                  AND status = 'active'
                  AND expires_at > NOW()
            ) AS found
            "#,
        )
        .bind(user_id)
        .bind(pass_type_id)
        .fetch_one(tx)
        .await?;

        Ok(row.get("found"))
    }

    /// 在事务中签发通卡
    pub async fn create_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
        pass_type_id: i64,
        credits: Option<i32>,
        duration_days: i32,
    ) -> Result<UserPass> {
        let pass = sqlx::query_as::<_, UserPass>(
            r#"
            INSERT INTO user_passes (user_id, pass_type_id, starts_at, expires_at,
                                     remaining_credits, status)
            VALUES ($1, $2, NOW(), NOW() + make_interval(days => $3), $4, 'active')
            RETURNING id, user_id, pass_type_id, starts_at, expires_at,
                      remaining_credits, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(pass_type_id)
        .bind(duration_days)
        .bind(credits)
        .fetch_one(tx)
        .await?;

        Ok(pass)
    }

    /// 在事务中更新通卡状态（管理侧停用等场景）
    pub async fn set_status_in_tx(
        tx: &mut PgConnection,
        pass_id: i64,
        status: UserPassStatus,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_passes
            SET status = $2
            WHERE id = $1
            "#,
        )
        .bind(pass_id)
        .bind(status)
        .execute(tx)
        .await?;

        Ok(result.rows_affected())
    }
}
