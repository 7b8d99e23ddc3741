//! 推送通知分发服务入口
//!
//! 从标准输入逐行读取 JSON 信封（NDJSON），交给分发总线处理。
//! 输入结束或收到终止信号后关闭。

use std::sync::Arc;

use anyhow::Result;
use push_dispatcher::{PushNotifications, TrayNotificationSink};
use push_shared::config::AppConfig;
use push_shared::events::PushEnvelope;
use push_shared::observability;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

const SERVICE_NAME: &str = "push-dispatcher";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载配置，失败时使用默认值
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        AppConfig {
            service_name: SERVICE_NAME.to_string(),
            ..AppConfig::default()
        }
    });

    // 2. 初始化可观测性
    let _guard = observability::init(&config.service_name, &config.observability)?;

    info!("Starting {}...", SERVICE_NAME);
    info!(environment = %config.environment, "Configuration loaded");

    // 3. 组装分发总线
    let sink = Arc::new(TrayNotificationSink::new());
    let bus = PushNotifications::from_app_config(&config, sink.clone())?;
    bus.initialize();

    // 4. 读取输入并排空，全程可被终止信号打断
    let run = async {
        read_envelopes(&bus).await?;
        info!("输入已结束，等待处理中的通知完成");
        bus.drain().await;
        Ok::<_, anyhow::Error>(())
    };

    tokio::select! {
        result = run => result?,
        _ = shutdown_signal() => {
            // 排空中被打断时，丢弃 drain 即关闭全部通道
            bus.shutdown();
        }
    }

    info!(visible = sink.visible_count(), "{} stopped", SERVICE_NAME);
    Ok(())
}

async fn read_envelopes(bus: &PushNotifications) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match PushEnvelope::from_json(line.as_bytes()) {
            Ok(envelope) => bus.submit(envelope),
            Err(e) => warn!(line = line_no, error = %e, "信封解析失败，跳过"),
        }
    }

    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
