//! 课程场次仓储
//!
//! 提供场次的数据访问，预约事务内用行级锁串行化同场次的容量检查

use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::{ClassSession, ClassSessionWithCount};

/// 课程场次仓储
pub struct ClassSessionRepository {
    pool: PgPool,
}

impl ClassSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 列出可预约的未来场次，附带当前预约数
    ///
    /// 只统计 booked 状态的预约，已取消的座位立即回到可见余量
    pub async fn list_upcoming(&self) -> Result<Vec<ClassSessionWithCount>> {
        let sessions = sqlx::query_as::<_, ClassSessionWithCount>(
            r#"
            SELECT cs.id, cs.title, cs.description, cs.starts_at, cs.ends_at,
                   cs.capacity, cs.location, cs.instructor, cs.active,
                   COUNT(b.id) FILTER (WHERE b.status = 'booked') AS booked_count
            FROM class_sessions cs
            LEFT JOIN bookings b ON b.class_session_id = cs.id
            WHERE cs.active = TRUE AND cs.starts_at > NOW()
            GROUP BY cs.id
            ORDER BY cs.starts_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    // ==================== 事务操作 ====================

    /// 在事务中锁定场次行
    ///
    /// FOR UPDATE 让同一场次的并发预约在此排队，容量检查
    /// 因此建立在稳定的行上；不存在或已下架都返回 None
    pub async fn lock_active_session(
        tx: &mut PgConnection,
        id: i64,
    ) -> Result<Option<ClassSession>> {
        let session = sqlx::query_as::<_, ClassSession>(
            r#"
            SELECT id, title, description, starts_at, ends_at, capacity,
                   location, instructor, active, created_at
            FROM class_sessions
            WHERE id = $1 AND active = TRUE
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(session)
    }
}
