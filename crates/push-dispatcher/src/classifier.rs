//! 信封分类器
//!
//! 四个纯谓词判断信封所属类别。类别由 `classify` 的单次匹配决定，
//! 四个谓词都委托给它，因此任何信封至多命中一个类别；
//! 不命中任何类别的信封不会被任何通道处理。

use push_shared::events::{ActivityCategory, PushEnvelope};

/// 通知类别，每个类别对应分发总线上的一条独立通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    FriendFollow,
    ProjectActivity,
    ProjectReminder,
    ProjectUpdate,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        Self::FriendFollow,
        Self::ProjectActivity,
        Self::ProjectReminder,
        Self::ProjectUpdate,
    ];

    /// 通道名称，用于日志字段和指标标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FriendFollow => "friend_follow",
            Self::ProjectActivity => "project_activity",
            Self::ProjectReminder => "project_reminder",
            Self::ProjectUpdate => "project_update",
        }
    }

    /// 该类别的过滤谓词
    pub fn matches(&self, envelope: &PushEnvelope) -> bool {
        classify(envelope) == Some(*self)
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 判断信封类别
///
/// 活动负载优先按 category 区分；只有不带活动负载的项目负载才是提醒。
/// 活动与项目负载同时出现的信封形状不合法，不属于任何类别。
pub fn classify(envelope: &PushEnvelope) -> Option<NotificationKind> {
    match (&envelope.activity, &envelope.project) {
        (Some(activity), None) => match activity.category {
            ActivityCategory::Follow => Some(NotificationKind::FriendFollow),
            ActivityCategory::Update => Some(NotificationKind::ProjectUpdate),
            category if category.is_project_lifecycle() => Some(NotificationKind::ProjectActivity),
            _ => None,
        },
        (None, Some(_)) => Some(NotificationKind::ProjectReminder),
        _ => None,
    }
}

pub fn is_friend_follow(envelope: &PushEnvelope) -> bool {
    NotificationKind::FriendFollow.matches(envelope)
}

pub fn is_project_activity(envelope: &PushEnvelope) -> bool {
    NotificationKind::ProjectActivity.matches(envelope)
}

pub fn is_project_reminder(envelope: &PushEnvelope) -> bool {
    NotificationKind::ProjectReminder.matches(envelope)
}

pub fn is_project_update_activity(envelope: &PushEnvelope) -> bool {
    NotificationKind::ProjectUpdate.matches(envelope)
}
