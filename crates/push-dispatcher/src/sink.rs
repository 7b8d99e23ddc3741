//! 通知渲染端
//!
//! 通过 `NotificationSink` trait 抽象系统通知栏。以 signature 为键：
//! 同一 signature 再次通知时替换已展示的通知。渲染失败属于渲染端自己的问题，
//! 接口不返回错误，调用方也不感知。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use crate::images::Bitmap;
use crate::presentation::AlertDescription;

/// 待渲染的通知：展示描述加上已加载的大图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    pub alert: AlertDescription,
    /// 大图加载失败或未请求时为空
    pub large_icon: Option<Bitmap>,
}

/// 通知渲染接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, signature: i32, notification: RenderedNotification);
}

/// 通知栏中的一条记录
#[derive(Debug, Clone)]
pub struct TrayEntry {
    pub notification: RenderedNotification,
    pub posted_at: DateTime<Utc>,
    /// 该 signature 累计被通知的次数
    pub revision: u32,
}

/// 模拟通知栏
///
/// 在内存中按 signature 保存当前可见的通知并记录日志。
/// 生产环境中替换为平台通知管理器的调用。
#[derive(Default)]
pub struct TrayNotificationSink {
    visible: DashMap<i32, TrayEntry>,
}

impl TrayNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, signature: i32) -> Option<TrayEntry> {
        self.visible.get(&signature).map(|entry| entry.clone())
    }

    /// 当前可见的通知数量
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// 当前可见通知的 signature 列表（升序）
    pub fn visible_signatures(&self) -> Vec<i32> {
        let mut signatures: Vec<i32> = self.visible.iter().map(|e| *e.key()).collect();
        signatures.sort_unstable();
        signatures
    }

    /// 移除一条通知（用户划掉或点击后自动移除）
    pub fn cancel(&self, signature: i32) -> bool {
        self.visible.remove(&signature).is_some()
    }

    pub fn clear(&self) {
        self.visible.clear();
    }
}

#[async_trait]
impl NotificationSink for TrayNotificationSink {
    async fn notify(&self, signature: i32, notification: RenderedNotification) {
        let title = notification.alert.title.clone();
        let has_icon = notification.large_icon.is_some();

        let revision = match self.visible.entry(signature) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.notification = notification;
                entry.posted_at = Utc::now();
                entry.revision += 1;
                entry.revision
            }
            Entry::Vacant(vacant) => {
                vacant.insert(TrayEntry {
                    notification,
                    posted_at: Utc::now(),
                    revision: 1,
                });
                1
            }
        };

        info!(
            signature,
            revision,
            title = %title,
            has_icon,
            "模拟展示系统通知"
        );
    }
}
