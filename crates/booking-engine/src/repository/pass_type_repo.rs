//! 通卡目录仓储
//!
//! 目录是运营侧数据，购买事务只读取，引擎从不回写

use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::PassType;

/// 通卡类型仓储
pub struct PassTypeRepository {
    pool: PgPool,
}

impl PassTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 列出在售的通卡类型
    pub async fn list_active(&self) -> Result<Vec<PassType>> {
        let pass_types = sqlx::query_as::<_, PassType>(
            r#"
            SELECT id, name, kind, credits, duration_days, active, created_at
            FROM pass_types
            WHERE active = TRUE
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(pass_types)
    }

    /// 在事务中获取通卡类型
    ///
    /// 购买事务读取目录项决定签发参数；目录不加锁，同类型的
    /// 并发购买由订阅唯一性检查在 SERIALIZABLE 下兜底
    pub async fn get_by_id_in_tx(tx: &mut PgConnection, id: i64) -> Result<Option<PassType>> {
        let pass_type = sqlx::query_as::<_, PassType>(
            r#"
            SELECT id, name, kind, credits, duration_days, active, created_at
            FROM pass_types
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(tx)
        .await?;

        Ok(pass_type)
    }
}
