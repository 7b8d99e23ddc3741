//! 动态补全阶段
//!
//! 仅用于项目动态通道：根据活动负载中的 project_id / update_id 拉取完整的
//! Update，与原始信封配对。缺少任一标识时不发起请求；拉取失败被吞掉，
//! 只产生"无输出"，不会中断通道。

use std::sync::Arc;

use push_shared::events::{PushEnvelope, Update};
use push_shared::observability::metrics::{self as push_metrics, names};
use tracing::{debug, warn};

use crate::classifier::NotificationKind;
use crate::client::UpdateClient;

/// 信封与其补全结果的临时配对，仅在补全阶段和动态展示构建之间传递
#[derive(Debug, Clone)]
pub struct EnvelopeUpdatePair {
    pub envelope: Arc<PushEnvelope>,
    pub update: Update,
}

/// 补全阶段的丢弃原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDropReason {
    /// 缺少 project_id 或 update_id，未发起请求
    MissingUpdateParams,
    /// 请求已发起但失败
    FetchFailed,
}

impl UpdateDropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingUpdateParams => "missing_update_params",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

/// 提取拉取参数 `(project_param, update_param)`
///
/// 任一标识缺失即返回 `None`，这是动态通道是否发起请求的唯一闸门。
pub fn update_params(envelope: &PushEnvelope) -> Option<(String, String)> {
    let activity = envelope.activity.as_ref()?;
    let update_id = activity.update_id?;
    let project_id = activity.project_id?;
    Some((project_id.to_string(), update_id.to_string()))
}

/// 拉取 Update 并与信封配对，失败时给出丢弃原因
pub async fn enrich_update(
    client: &dyn UpdateClient,
    envelope: Arc<PushEnvelope>,
) -> std::result::Result<EnvelopeUpdatePair, UpdateDropReason> {
    let Some((project_param, update_param)) = update_params(&envelope) else {
        debug!(signature = envelope.signature, "动态通知缺少 project_id 或 update_id，跳过拉取");
        return Err(UpdateDropReason::MissingUpdateParams);
    };

    match client.fetch_update(&project_param, &update_param).await {
        Ok(update) => Ok(EnvelopeUpdatePair { envelope, update }),
        Err(e) => {
            metrics::counter!(names::UPDATE_FETCH_FAILURES).increment(1);
            warn!(
                signature = envelope.signature,
                project = %project_param,
                update = %update_param,
                error = %e,
                "项目动态拉取失败，丢弃该通知"
            );
            Err(UpdateDropReason::FetchFailed)
        }
    }
}

/// 拉取 Update 并与信封配对，丢弃时计入通道丢弃指标
pub async fn fetch_update_with_envelope(
    client: &dyn UpdateClient,
    envelope: Arc<PushEnvelope>,
) -> Option<EnvelopeUpdatePair> {
    match enrich_update(client, envelope).await {
        Ok(pair) => Some(pair),
        Err(reason) => {
            push_metrics::record_drop(NotificationKind::ProjectUpdate.as_str(), reason.as_str());
            None
        }
    }
}
