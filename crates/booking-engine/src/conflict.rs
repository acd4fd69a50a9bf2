//! 串行化冲突处理
//!
//! 三个事务都在 SERIALIZABLE 隔离级别下执行。Postgres 在提交时
//! 检测到不可串行化的交错会以 SQLSTATE 40001 中止事务，这类失败
//! 是暂时性的：整个事务原样重试一次通常就能成功。
//!
//! 策略：恰好重试一次。第二次仍冲突说明竞争异常激烈，向调用方
//! 返回内部错误而不是无限重试。

use std::future::Future;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use crate::error::{BookingError, Result};

/// 开启一个 SERIALIZABLE 事务
///
/// 隔离级别必须是事务内的第一条语句设置
pub async fn begin_serializable(pool: &PgPool) -> Result<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// 执行事务闭包，串行化冲突（40001）时整体重试一次
///
/// `f` 每次调用都要自己开启并提交事务：重试即从头再来，
/// 不存在半途恢复。第二次冲突不再暴露 40001，统一折叠为
/// 内部错误。
pub async fn retry_once_on_conflict<F, Fut, T>(op_name: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Err(err) if err.is_serialization_conflict() => {
            warn!(operation = op_name, "serialization conflict, retrying once");
            match f().await {
                Err(err) if err.is_serialization_conflict() => {
                    warn!(operation = op_name, "serialization conflict on retry, giving up");
                    Err(BookingError::Internal(format!(
                        "{op_name}: transaction aborted twice under contention"
                    )))
                }
                other => other,
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    // 40001 只能由真实的 Postgres 产生，这里覆盖非冲突路径；
    // 冲突重试路径由数据库集成测试覆盖。

    #[tokio::test]
    async fn test_success_runs_once() {
        let calls = AtomicU32::new(0);
        let result = retry_once_on_conflict("test_op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, BookingError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_business_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_once_on_conflict("test_op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BookingError::NoCredits(7)) }
        })
        .await;
        assert!(matches!(result, Err(BookingError::NoCredits(7))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_database_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_once_on_conflict("test_op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BookingError::Database(sqlx::Error::PoolClosed)) }
        })
        .await;
        assert!(matches!(result, Err(BookingError::Database(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
