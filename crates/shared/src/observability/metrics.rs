//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use std::net::SocketAddr;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

/// 指标名称
pub mod names {
    pub const ENVELOPES_RECEIVED: &str = "push_envelopes_received_total";
    pub const ENVELOPES_DROPPED: &str = "push_envelopes_dropped_total";
    pub const NOTIFICATIONS_RENDERED: &str = "push_notifications_rendered_total";
    pub const UPDATE_FETCH_FAILURES: &str = "push_update_fetch_failures_total";
    pub const IMAGE_LOAD_FAILURES: &str = "push_image_load_failures_total";
    pub const LANE_OVERFLOWS: &str = "push_lane_overflows_total";
}

/// Metrics 资源守卫
///
/// exporter 的 HTTP 监听由 recorder 自身托管，这里只记录监听地址。
pub struct MetricsHandle {
    pub addr: SocketAddr,
}

/// 初始化 Prometheus 指标导出
///
/// 需要在 tokio 运行时内调用，exporter 会在指定端口暴露 `/metrics`。
pub fn init(service_name: &str, port: u16) -> Result<MetricsHandle> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", service_name.to_string())
        .install()?;

    register_common_metrics(service_name);
    info!("Metrics exporter listening on {}", addr);

    Ok(MetricsHandle { addr })
}

/// 注册指标描述，出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        names::ENVELOPES_RECEIVED,
        "Total number of push envelopes accepted by the dispatch bus"
    );
    metrics::describe_counter!(
        names::ENVELOPES_DROPPED,
        "Envelopes dropped by a lane after matching its category"
    );
    metrics::describe_counter!(
        names::NOTIFICATIONS_RENDERED,
        "Notifications handed to the rendering sink"
    );
    metrics::describe_counter!(
        names::UPDATE_FETCH_FAILURES,
        "Failed fetches of project updates"
    );
    metrics::describe_counter!(
        names::IMAGE_LOAD_FAILURES,
        "Failed large icon loads, rendered without image"
    );
    metrics::describe_counter!(
        names::LANE_OVERFLOWS,
        "Envelopes rejected by a full bounded lane"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 记录信封被通道丢弃
#[inline]
pub fn record_drop(lane: &'static str, reason: &'static str) {
    metrics::counter!(names::ENVELOPES_DROPPED, "lane" => lane, "reason" => reason).increment(1);
}

/// 记录通知已交给渲染端
#[inline]
pub fn record_render(lane: &'static str) {
    metrics::counter!(names::NOTIFICATIONS_RENDERED, "lane" => lane).increment(1);
}
