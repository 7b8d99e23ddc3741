//! 推送通知分发服务
//!
//! 接收外部推送的信封，分类到四条独立通道（好友关注、项目活动、项目提醒、
//! 项目动态），各通道独立完成补全、展示构建和渲染。
//! 残缺信封和补全失败一律静默丢弃，单个通道的失败不影响其他通道。

pub mod classifier;
pub mod client;
pub mod dispatcher;
pub mod enrichment;
pub mod error;
pub mod handlers;
pub mod images;
pub mod navigation;
pub mod presentation;
pub mod registrar;
pub mod sink;

pub use classifier::{NotificationKind, classify};
pub use dispatcher::{Collaborators, PushNotifications};
pub use error::{NotificationError, Result};
pub use presentation::{AlertDescription, AlertPresenter, AlertStyle};
pub use sink::{NotificationSink, RenderedNotification, TrayNotificationSink};
