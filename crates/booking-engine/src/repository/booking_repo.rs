//! 预约仓储
//!
//! 部分唯一索引 uniq_bookings_active (user_id, class_session_id)
//! WHERE status = 'booked' 在数据库层兜底"同场次不可重复预约"，
//! 插入撞索引时在这里翻译成业务错误。

use sqlx::{PgConnection, PgPool};

use crate::error::{BookingError, Result};
use crate::models::{Booking, BookingWithSession};

/// 预约仓储
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 列出用户的全部预约（含场次信息），最近的在前
    pub async fn list_with_session(&self, user_id: i64) -> Result<Vec<BookingWithSession>> {
        let bookings = sqlx::query_as::<_, BookingWithSession>(
            r#"
            SELECT b.id, b.user_id, b.class_session_id, b.user_pass_id,
                   b.status, b.created_at,
                   cs.title, cs.starts_at, cs.ends_at, cs.location, cs.instructor
            FROM bookings b
            JOIN class_sessions cs ON cs.id = b.class_session_id
            WHERE b.user_id = $1
            ORDER BY cs.starts_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    // ==================== 事务操作 ====================

    /// 在事务中统计场次当前的 booked 预约数
    ///
    /// 必须在场次行已被 FOR UPDATE 锁定后调用，计数才是权威的
    pub async fn count_booked_in_tx(tx: &mut PgConnection, class_session_id: i64) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE class_session_id = $1 AND status = 'booked'
            "#,
        )
        .bind(class_session_id)
        .fetch_one(tx)
        .await?;

        Ok(count)
    }

    /// 在事务中创建预约
    ///
    /// 撞上部分唯一索引（SQLSTATE 23505）翻译为 already_booked
    pub async fn create_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
        class_session_id: i64,
        user_pass_id: i64,
    ) -> Result<Booking> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (user_id, class_session_id, user_pass_id, status)
            VALUES ($1, $2, $3, 'booked')
            RETURNING id, user_id, class_session_id, user_pass_id, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(class_session_id)
        .bind(user_pass_id)
        .fetch_one(tx)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                BookingError::AlreadyBooked {
                    user_id,
                    class_session_id,
                }
            }
            _ => BookingError::Database(err),
        })?;

        Ok(booking)
    }

    /// 在事务中锁定用户的一条预约
    ///
    /// 按 id + user_id 查，别人的预约对调用方等同于不存在
    pub async fn lock_by_id_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
        booking_id: i64,
    ) -> Result<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, class_session_id, user_pass_id, status, created_at
            FROM bookings
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(booking_id)
        .bind(user_id)
        .fetch_optional(tx)
        .await?;

        Ok(booking)
    }

    /// 在事务中把预约置为 cancelled
    pub async fn cancel_in_tx(tx: &mut PgConnection, booking_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'cancelled'
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .execute(tx)
        .await?;

        Ok(())
    }
}
