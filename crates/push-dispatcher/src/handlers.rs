//! 通道处理器
//!
//! 每条通道的终端动作：构建通知描述，加载大图，交给渲染端。
//! 处理器之间不共享可变状态，单个通知的任何失败都只影响它自己。

use std::sync::Arc;

use push_shared::events::PushEnvelope;
use push_shared::observability::metrics::{self as push_metrics, names};
use tracing::{debug, instrument, warn};

use crate::classifier::NotificationKind;
use crate::enrichment::EnvelopeUpdatePair;
use crate::images::{Bitmap, ImageLoader, ImageRequest};
use crate::presentation::{AlertDescription, AlertPresenter};
use crate::sink::{NotificationSink, RenderedNotification};

/// 通道处理器
#[derive(Clone)]
pub struct NotificationHandlers {
    presenter: AlertPresenter,
    images: Arc<dyn ImageLoader>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationHandlers {
    pub fn new(
        presenter: AlertPresenter,
        images: Arc<dyn ImageLoader>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            presenter,
            images,
            sink,
        }
    }

    #[instrument(skip_all, fields(signature = envelope.signature))]
    pub async fn display_friend_follow(&self, envelope: Arc<PushEnvelope>) {
        let alert = self.presenter.friend_follow(&envelope);
        self.display(NotificationKind::FriendFollow, &envelope, alert, "missing_activity")
            .await;
    }

    #[instrument(skip_all, fields(signature = envelope.signature))]
    pub async fn display_project_activity(&self, envelope: Arc<PushEnvelope>) {
        let alert = self.presenter.project_activity(&envelope);
        self.display(
            NotificationKind::ProjectActivity,
            &envelope,
            alert,
            "missing_project_id",
        )
        .await;
    }

    #[instrument(skip_all, fields(signature = envelope.signature))]
    pub async fn display_project_reminder(&self, envelope: Arc<PushEnvelope>) {
        let alert = self.presenter.project_reminder(&envelope);
        self.display(
            NotificationKind::ProjectReminder,
            &envelope,
            alert,
            "missing_project",
        )
        .await;
    }

    #[instrument(skip_all, fields(signature = pair.envelope.signature, update_id = pair.update.id))]
    pub async fn display_project_update(&self, pair: EnvelopeUpdatePair) {
        let alert = self.presenter.project_update(&pair.envelope, &pair.update);
        self.display(
            NotificationKind::ProjectUpdate,
            &pair.envelope,
            alert,
            "missing_update_params",
        )
        .await;
    }

    async fn display(
        &self,
        kind: NotificationKind,
        envelope: &PushEnvelope,
        alert: Option<AlertDescription>,
        drop_reason: &'static str,
    ) {
        let Some(alert) = alert else {
            push_metrics::record_drop(kind.as_str(), drop_reason);
            debug!(lane = %kind, reason = drop_reason, "信封缺少必需字段，丢弃");
            return;
        };

        let large_icon = match &alert.large_image {
            Some(request) => self.fetch_bitmap(request).await,
            None => None,
        };

        self.sink
            .notify(envelope.signature, RenderedNotification { alert, large_icon })
            .await;
        push_metrics::record_render(kind.as_str());
    }

    /// 加载大图，失败时降级为无图通知
    async fn fetch_bitmap(&self, request: &ImageRequest) -> Option<Bitmap> {
        match self.images.load(request).await {
            Ok(bitmap) => Some(bitmap),
            Err(e) => {
                metrics::counter!(names::IMAGE_LOAD_FAILURES).increment(1);
                warn!(url = %request.url, error = %e, "大图加载失败");
                None
            }
        }
    }
}
