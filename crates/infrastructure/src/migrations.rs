//! 数据库迁移
//!
//! 迁移脚本由部署环境提供，运行时从目录加载（sqlx 命名规则 `<版本>_<描述>.sql`），
//! 在服务开始处理请求之前执行一次。

use std::{collections::HashSet, path::Path, str::FromStr};

use sqlx::{
    migrate::{Migrate, MigrateError, Migrator},
    postgres::PgConnectOptions,
    Connection, PgConnection,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// 本次应用的迁移版本，按升序
    Applied(Vec<i64>),
    /// 没有待应用的迁移，视为成功
    NoChangeNeeded,
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("invalid database descriptor: {0}")]
    Configuration(#[source] sqlx::Error),
    #[error("failed to load migration scripts from {path}: {source}")]
    Source {
        path: String,
        #[source]
        source: MigrateError,
    },
    #[error("failed to connect for migrations: {0}")]
    Connect(#[source] sqlx::Error),
    /// 脚本执行失败或 schema 处于部分迁移状态，不自动重试
    #[error("migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// 把 schema 升级到脚本目录中的最新版本。
pub async fn apply_migrations(
    descriptor: &str,
    scripts_dir: impl AsRef<Path>,
) -> Result<MigrationOutcome, MigrationError> {
    let scripts_dir = scripts_dir.as_ref();
    let options = PgConnectOptions::from_str(descriptor).map_err(MigrationError::Configuration)?;

    let migrator = Migrator::new(scripts_dir)
        .await
        .map_err(|source| MigrationError::Source {
            path: scripts_dir.display().to_string(),
            source,
        })?;

    let mut conn = PgConnection::connect_with(&options)
        .await
        .map_err(MigrationError::Connect)?;

    let outcome = run_pending(&migrator, &mut conn).await;
    // 连接关闭失败不影响迁移结果
    let _ = conn.close().await;

    let outcome = outcome?;
    match &outcome {
        MigrationOutcome::Applied(versions) => {
            info!(?versions, path = %scripts_dir.display(), "数据库迁移已应用")
        }
        MigrationOutcome::NoChangeNeeded => info!("数据库 schema 已是最新版本"),
    }
    Ok(outcome)
}

async fn run_pending(
    migrator: &Migrator,
    conn: &mut PgConnection,
) -> Result<MigrationOutcome, MigrationError> {
    conn.ensure_migrations_table().await?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|migration| migration.version)
        .collect();

    let mut pending: Vec<i64> = migrator
        .iter()
        .filter(|migration| migration.migration_type.is_up_migration())
        .map(|migration| migration.version)
        .filter(|version| !applied.contains(version))
        .collect();
    pending.sort_unstable();

    migrator.run(&mut *conn).await?;

    if pending.is_empty() {
        Ok(MigrationOutcome::NoChangeNeeded)
    } else {
        Ok(MigrationOutcome::Applied(pending))
    }
}
