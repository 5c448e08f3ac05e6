use std::{path::PathBuf, sync::Arc};

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::{
    connection::{acquire, release, ConnectionError},
    migrations::{apply_migrations, MigrationError},
    repository::PgSubscriptionRepository,
    retry::RetryConfig,
};

#[derive(Debug, Clone)]
pub struct InfrastructureConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub migrations_path: PathBuf,
    pub retry: RetryConfig,
}

impl From<&config::AppConfig> for InfrastructureConfig {
    fn from(value: &config::AppConfig) -> Self {
        Self {
            database_url: value.storage_path.clone(),
            max_connections: value.database.max_connections,
            migrations_path: PathBuf::from(&value.migrations_path),
            retry: RetryConfig::from(&value.database),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("database connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// 启动顺序：连接池就绪 -> 迁移完成 -> 仓储可用
#[derive(Clone)]
pub struct Infrastructure {
    pub pool: PgPool,
    pub subscription_repository: Arc<PgSubscriptionRepository>,
}

impl Infrastructure {
    pub async fn connect(config: InfrastructureConfig) -> Result<Self, InfrastructureError> {
        let pool = acquire(&config.database_url, config.max_connections, &config.retry).await?;

        if let Err(err) = apply_migrations(&config.database_url, &config.migrations_path).await {
            release(&pool).await;
            return Err(err.into());
        }

        let subscription_repository = Arc::new(PgSubscriptionRepository::new(pool.clone()));

        Ok(Self {
            pool,
            subscription_repository,
        })
    }

    pub async fn shutdown(&self) {
        release(&self.pool).await;
        info!("基础设施已关闭");
    }
}

