//! 主应用程序入口
//!
//! 启动顺序：配置 -> 连接池（带重试）-> 迁移 -> HTTP 服务。

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use application::SubscriptionService;
use config::AppConfig;
use infrastructure::{Infrastructure, InfrastructureConfig};
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, HttpSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志，未设置 RUST_LOG 时默认 info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = AppConfig::load().context("加载配置失败")?;
    info!(env = %cfg.env, storage = %cfg.sanitized_storage_path(), "配置已加载");

    let infra = Infrastructure::connect(InfrastructureConfig::from(&cfg))
        .await
        .context("初始化存储失败")?;

    let service =
        SubscriptionService::new(infra.subscription_repository.clone(), cfg.request_timeout());
    let state = AppState::new(Arc::new(service));
    let app = router(
        state,
        HttpSettings {
            request_timeout: cfg.http_server.timeout(),
        },
    );

    let result = serve(app, &cfg).await;
    infra.shutdown().await;
    result
}

async fn serve(app: axum::Router, cfg: &AppConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.http_server.host)
        .await
        .with_context(|| format!("无法监听 {}", cfg.http_server.host))?;
    info!(address = %cfg.http_server.host, "订阅服务启动");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined.context("HTTP 服务任务异常退出")??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    info!("收到停止信号，等待进行中的请求完成");
    let _ = stop_tx.send(true);

    let grace: Duration = cfg.http_server.shutdown_timeout();
    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => {
            if let Err(err) = joined.context("HTTP 服务任务异常退出")? {
                error!(error = %err, "HTTP 服务关闭出错");
            }
        }
        Err(_) => {
            warn!(?grace, "优雅关闭超时，强制结束");
            server.abort();
        }
    }

    info!("HTTP 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "无法监听 Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "无法监听 SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
