//! 推送信封模型
//!
//! 定义消息通道送达的推送信封格式、活动类别，以及分发时需要的
//! 项目动态（Update）资源模型。信封由上游定义，本模块只负责消费，
//! 因此所有字段都尽量宽容地反序列化：缺失的可选字段不会导致解析失败，
//! 是否可以渲染由分类器和各展示构建器判断。

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// ActivityCategory 活动类别
// ---------------------------------------------------------------------------

/// 活动类别
///
/// 对应后端活动流中的 category 字段。未识别的类别反序列化为 `Unknown`，
/// 由分类器直接丢弃，而不是让整个信封解析失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityCategory {
    Backing,
    Cancellation,
    CommentProject,
    Failure,
    Follow,
    Launch,
    Success,
    Suspension,
    Update,
    Watch,
    #[serde(other)]
    Unknown,
}

impl ActivityCategory {
    /// 项目生命周期类活动：支持、取消、失败、上线、成功、暂停
    pub fn is_project_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::Backing
                | Self::Cancellation
                | Self::Failure
                | Self::Launch
                | Self::Success
                | Self::Suspension
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backing => "backing",
            Self::Cancellation => "cancellation",
            Self::CommentProject => "comment-project",
            Self::Failure => "failure",
            Self::Follow => "follow",
            Self::Launch => "launch",
            Self::Success => "success",
            Self::Suspension => "suspension",
            Self::Update => "update",
            Self::Watch => "watch",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PushEnvelope 推送信封
// ---------------------------------------------------------------------------

/// 展示负载：系统通知栏中的标题和正文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gcm {
    pub title: String,
    /// 通知正文
    pub alert: String,
}

/// 活动负载
///
/// `project_id` / `update_id` 是否存在决定了能构建哪种通知，
/// 缺少所需字段的信封视为残缺数据，由对应通道静默丢弃。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub category: ActivityCategory,
    pub id: i64,
    #[serde(default)]
    pub user_photo: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub project_photo: Option<String>,
    #[serde(default)]
    pub update_id: Option<i64>,
}

/// 项目提醒负载
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReminder {
    pub id: i64,
    pub photo: String,
}

/// 推送信封
///
/// 不可变记录。`signature` 标识一个逻辑通知槽位：相同 signature 的后续通知
/// 替换而非叠加已展示的通知。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub signature: i32,
    pub gcm: Gcm,
    #[serde(default)]
    pub activity: Option<Activity>,
    #[serde(default)]
    pub project: Option<ProjectReminder>,
}

impl PushEnvelope {
    /// 从消息通道送达的原始 JSON 字节解析信封
    pub fn from_json(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// 从已解析的 JSON 值构造信封
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn title(&self) -> &str {
        &self.gcm.title
    }

    pub fn body(&self) -> &str {
        &self.gcm.alert
    }
}

// ---------------------------------------------------------------------------
// Update 项目动态
// ---------------------------------------------------------------------------

/// 项目动态的网页地址集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWebUrls {
    pub update: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUrls {
    pub web: UpdateWebUrls,
}

/// 项目动态全文资源
///
/// 每个信封单独拉取，不做缓存；展示构建器消费后即释放。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    pub urls: UpdateUrls,
}

impl Update {
    /// 点击通知后在内嵌网页中打开的地址
    pub fn web_url(&self) -> &str {
        &self.urls.web.update
    }
}
