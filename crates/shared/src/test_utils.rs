//! 测试工具模块
//!
//! 提供构造各类推送信封和项目动态的辅助函数，
//! 供单元测试、端到端测试和基准测试复用。

use std::sync::atomic::{AtomicI32, Ordering};

use crate::events::{Activity, ActivityCategory, Gcm, ProjectReminder, PushEnvelope, Update};

/// 生成唯一的测试 signature
///
/// 使用原子计数器确保并行测试时的唯一性
pub fn test_signature() -> i32 {
    static COUNTER: AtomicI32 = AtomicI32::new(10_000);
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// 信封构建器
///
/// 默认生成一个没有任何子负载的信封（不属于任何类别）。
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    envelope: PushEnvelope,
}

impl EnvelopeBuilder {
    pub fn new(signature: i32) -> Self {
        Self {
            envelope: PushEnvelope {
                signature,
                gcm: Gcm {
                    title: "Kickstarter".to_string(),
                    alert: "You have a new notification".to_string(),
                },
                activity: None,
                project: None,
            },
        }
    }

    pub fn gcm(mut self, title: &str, alert: &str) -> Self {
        self.envelope.gcm = Gcm {
            title: title.to_string(),
            alert: alert.to_string(),
        };
        self
    }

    /// 设置活动负载，其余字段置空
    pub fn activity(mut self, category: ActivityCategory) -> Self {
        self.envelope.activity = Some(Activity {
            category,
            id: i64::from(self.envelope.signature),
            user_photo: None,
            project_id: None,
            project_photo: None,
            update_id: None,
        });
        self
    }

    pub fn user_photo(mut self, url: &str) -> Self {
        if let Some(activity) = self.envelope.activity.as_mut() {
            activity.user_photo = Some(url.to_string());
        }
        self
    }

    pub fn project_id(mut self, project_id: i64) -> Self {
        if let Some(activity) = self.envelope.activity.as_mut() {
            activity.project_id = Some(project_id);
        }
        self
    }

    pub fn project_photo(mut self, url: &str) -> Self {
        if let Some(activity) = self.envelope.activity.as_mut() {
            activity.project_photo = Some(url.to_string());
        }
        self
    }

    pub fn update_id(mut self, update_id: i64) -> Self {
        if let Some(activity) = self.envelope.activity.as_mut() {
            activity.update_id = Some(update_id);
        }
        self
    }

    pub fn reminder(mut self, project_id: i64, photo: &str) -> Self {
        self.envelope.project = Some(ProjectReminder {
            id: project_id,
            photo: photo.to_string(),
        });
        self
    }

    pub fn build(self) -> PushEnvelope {
        self.envelope
    }
}

/// 好友关注通知
pub fn friend_follow_envelope(signature: i32) -> PushEnvelope {
    EnvelopeBuilder::new(signature)
        .gcm("New follower", "Ada is following you")
        .activity(ActivityCategory::Follow)
        .user_photo("http://x/ada.jpg")
        .build()
}

/// 项目活动通知
pub fn project_activity_envelope(signature: i32, project_id: i64) -> PushEnvelope {
    EnvelopeBuilder::new(signature)
        .gcm("Funded!", "Project X reached its goal")
        .activity(ActivityCategory::Success)
        .project_id(project_id)
        .project_photo("http://x/p.jpg")
        .build()
}

/// 项目提醒通知
pub fn project_reminder_envelope(signature: i32, project_id: i64) -> PushEnvelope {
    EnvelopeBuilder::new(signature)
        .gcm("Last call", "Project X ends in 48 hours")
        .reminder(project_id, "http://x/cover.jpg")
        .build()
}

/// 项目动态通知
pub fn project_update_envelope(signature: i32, project_id: i64, update_id: i64) -> PushEnvelope {
    EnvelopeBuilder::new(signature)
        .gcm("Update #5", "Shipping has started")
        .activity(ActivityCategory::Update)
        .project_id(project_id)
        .update_id(update_id)
        .project_photo("http://x/p.jpg")
        .build()
}

/// 项目动态资源
pub fn test_update(project_id: i64, update_id: i64, web_url: &str) -> Update {
    Update {
        id: update_id,
        project_id: Some(project_id),
        title: Some(format!("Update #{update_id}")),
        urls: crate::events::UpdateUrls {
            web: crate::events::UpdateWebUrls {
                update: web_url.to_string(),
            },
        },
    }
}
