//! 连接池管理
//!
//! 把连接描述转换为经过探活的有界连接池，启动阶段按线性退避重试，
//! 关闭时释放全部连接。

use std::{str::FromStr, time::Duration};

use futures::future::BoxFuture;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, PgPool,
};
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::retry::RetryConfig;

/// 单次尝试失败的原因
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("pool construction failed: {0}")]
    Construct(#[source] sqlx::Error),
    #[error("liveness check failed: {0}")]
    Liveness(#[source] sqlx::Error),
    #[error("{phase} timed out after {after:?}")]
    TimedOut { phase: &'static str, after: Duration },
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    /// 描述无法解析，不重试
    #[error("invalid database descriptor: {0}")]
    Configuration(#[source] sqlx::Error),
    /// 重试预算耗尽，启动应当中止
    #[error("database unreachable after {attempts} attempts: {source}")]
    Connectivity {
        attempts: u32,
        #[source]
        source: AttemptError,
    },
}

/// 连接池的构建、探活与释放。
///
/// 启动重试循环只通过这三个调用产生副作用，测试中可以替换为假实现。
pub trait PoolFactory: Send + Sync {
    type Pool: Send + Sync;

    fn connect(&self) -> BoxFuture<'_, Result<Self::Pool, sqlx::Error>>;
    fn ping<'a>(&'a self, pool: &'a Self::Pool) -> BoxFuture<'a, Result<(), sqlx::Error>>;
    fn close(&self, pool: Self::Pool) -> BoxFuture<'_, ()>;
}

/// 基于 sqlx 的 PostgreSQL 连接池工厂
#[derive(Debug, Clone)]
pub struct PgPoolFactory {
    options: PgConnectOptions,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl PgPoolFactory {
    pub fn from_descriptor(
        descriptor: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let options =
            PgConnectOptions::from_str(descriptor).map_err(ConnectionError::Configuration)?;
        Ok(Self {
            options,
            max_connections,
            acquire_timeout,
        })
    }
}

impl PoolFactory for PgPoolFactory {
    type Pool = PgPool;

    fn connect(&self) -> BoxFuture<'_, Result<PgPool, sqlx::Error>> {
        Box::pin(async move {
            PgPoolOptions::new()
                .max_connections(self.max_connections)
                .acquire_timeout(self.acquire_timeout)
                .connect_with(self.options.clone())
                .await
        })
    }

    fn ping<'a>(&'a self, pool: &'a PgPool) -> BoxFuture<'a, Result<(), sqlx::Error>> {
        Box::pin(async move {
            let mut conn = pool.acquire().await?;
            conn.ping().await
        })
    }

    fn close(&self, pool: PgPool) -> BoxFuture<'_, ()> {
        Box::pin(async move { pool.close().await })
    }
}

enum BootstrapState<P> {
    Constructing { attempt: u32 },
    CheckingLiveness { attempt: u32, pool: P },
    Succeeded(P),
    Exhausted { attempts: u32, source: AttemptError },
}

/// 驱动“构建 -> 探活”循环，直到成功或耗尽重试次数。
///
/// 第 n 次失败后等待 `backoff.delay_at(n)`，包括最后一次。
/// 探活失败时已构建的连接池会先被关闭，再进入下一次尝试。
pub async fn bootstrap<F>(factory: &F, retry: &RetryConfig) -> Result<F::Pool, ConnectionError>
where
    F: PoolFactory,
{
    let mut state = BootstrapState::Constructing { attempt: 1 };

    loop {
        state = match state {
            BootstrapState::Constructing { attempt } => {
                debug!(attempt, "构建数据库连接池");
                match timeout(retry.attempt_timeout, factory.connect()).await {
                    Ok(Ok(pool)) => BootstrapState::CheckingLiveness { attempt, pool },
                    Ok(Err(err)) => {
                        after_failure(retry, attempt, AttemptError::Construct(err)).await
                    }
                    Err(_) => {
                        let err = AttemptError::TimedOut {
                            phase: "pool construction",
                            after: retry.attempt_timeout,
                        };
                        after_failure(retry, attempt, err).await
                    }
                }
            }
            BootstrapState::CheckingLiveness { attempt, pool } => {
                let outcome = timeout(retry.attempt_timeout, factory.ping(&pool)).await;
                match outcome {
                    Ok(Ok(())) => BootstrapState::Succeeded(pool),
                    Ok(Err(err)) => {
                        factory.close(pool).await;
                        after_failure(retry, attempt, AttemptError::Liveness(err)).await
                    }
                    Err(_) => {
                        factory.close(pool).await;
                        let err = AttemptError::TimedOut {
                            phase: "liveness check",
                            after: retry.attempt_timeout,
                        };
                        after_failure(retry, attempt, err).await
                    }
                }
            }
            BootstrapState::Succeeded(pool) => return Ok(pool),
            BootstrapState::Exhausted { attempts, source } => {
                return Err(ConnectionError::Connectivity { attempts, source })
            }
        };
    }
}

async fn after_failure<P>(
    retry: &RetryConfig,
    attempt: u32,
    error: AttemptError,
) -> BootstrapState<P> {
    let delay = retry.backoff.delay_at(attempt);
    warn!(
        attempt,
        max_attempts = retry.max_attempts,
        delay_secs = delay.as_secs_f64(),
        error = %error,
        "数据库连接尝试失败"
    );
    sleep(delay).await;

    if attempt >= retry.max_attempts {
        BootstrapState::Exhausted {
            attempts: attempt,
            source: error,
        }
    } else {
        BootstrapState::Constructing {
            attempt: attempt + 1,
        }
    }
}

/// 解析连接描述并建立经过探活的连接池
pub async fn acquire(
    descriptor: &str,
    max_connections: u32,
    retry: &RetryConfig,
) -> Result<PgPool, ConnectionError> {
    let factory =
        PgPoolFactory::from_descriptor(descriptor, max_connections, retry.attempt_timeout)?;
    let pool = bootstrap(&factory, retry).await?;
    info!(max_connections, "数据库连接池已就绪");
    Ok(pool)
}

/// 关闭连接池；重复调用是安全的
pub async fn release(pool: &PgPool) {
    if pool.is_closed() {
        debug!("数据库连接池已经关闭");
        return;
    }
    pool.close().await;
    info!("数据库连接池已关闭");
}
