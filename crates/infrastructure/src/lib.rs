//! 基础设施层实现。
//!
//! 提供连接池管理、数据库迁移以及订阅仓储的 PostgreSQL 实现。

pub mod builder;
pub mod connection;
pub mod migrations;
pub mod repository;
pub mod retry;

pub use builder::{Infrastructure, InfrastructureConfig, InfrastructureError};
pub use connection::{acquire, bootstrap, release, ConnectionError, PgPoolFactory, PoolFactory};
pub use migrations::{apply_migrations, MigrationError, MigrationOutcome};
pub use repository::PgSubscriptionRepository;
pub use retry::{Backoff, RetryConfig};
