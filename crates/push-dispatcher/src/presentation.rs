//! 通知展示构建
//!
//! 每个类别一个纯函数，把（信封，可选的补充数据）转换为可渲染的通知描述：
//! 标题、正文、大图请求和点击跳转目标。缺少该类别必需字段的信封返回 `None`，
//! 由调用方静默丢弃。

use std::sync::Arc;

use push_shared::config::PresentationConfig;
use push_shared::events::{PushEnvelope, Update};

use crate::images::ImageRequest;
use crate::navigation::{NavHop, Screen, TapTarget, TapTargetBuilder};

/// 通知固定样式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertStyle {
    pub small_icon: String,
    pub accent_color: String,
    /// 展开后以大段文本样式展示正文
    pub big_text: bool,
    /// 点击后自动移除
    pub auto_cancel: bool,
}

impl From<&PresentationConfig> for AlertStyle {
    fn from(config: &PresentationConfig) -> Self {
        Self {
            small_icon: config.small_icon.clone(),
            accent_color: config.accent_color.clone(),
            big_text: true,
            auto_cancel: true,
        }
    }
}

impl Default for AlertStyle {
    fn default() -> Self {
        Self::from(&PresentationConfig::default())
    }
}

/// 可渲染的通知描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDescription {
    pub title: String,
    pub body: String,
    pub style: AlertStyle,
    pub large_image: Option<ImageRequest>,
    pub tap_target: Option<TapTarget>,
}

impl AlertDescription {
    fn new(envelope: &PushEnvelope, style: &AlertStyle) -> Self {
        Self {
            title: envelope.title().to_string(),
            body: envelope.body().to_string(),
            style: style.clone(),
            large_image: None,
            tap_target: None,
        }
    }
}

/// 展示构建器
///
/// 仅持有样式配置，所有构建方法都是无副作用的纯函数。
#[derive(Debug, Clone, Default)]
pub struct AlertPresenter {
    style: AlertStyle,
}

impl AlertPresenter {
    pub fn new(style: AlertStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &AlertStyle {
        &self.style
    }

    /// 好友关注：头像加圆形遮罩，无跳转目标
    pub fn friend_follow(&self, envelope: &PushEnvelope) -> Option<AlertDescription> {
        let activity = envelope.activity.as_ref()?;

        let mut alert = AlertDescription::new(envelope, &self.style);
        alert.large_image = activity.user_photo.as_deref().map(ImageRequest::circle);
        Some(alert)
    }

    /// 项目活动：有封面时按正方形裁剪，点击进入项目页
    pub fn project_activity(&self, envelope: &Arc<PushEnvelope>) -> Option<AlertDescription> {
        let activity = envelope.activity.as_ref()?;
        let project_id = activity.project_id?;

        let mut alert = AlertDescription::new(envelope, &self.style);
        alert.large_image = activity.project_photo.as_deref().map(ImageRequest::square);
        alert.tap_target = Some(project_target(envelope, project_id.to_string()));
        Some(alert)
    }

    /// 项目提醒：使用提醒负载自身的项目 id 和封面
    pub fn project_reminder(&self, envelope: &Arc<PushEnvelope>) -> Option<AlertDescription> {
        let project = envelope.project.as_ref()?;

        let mut alert = AlertDescription::new(envelope, &self.style);
        alert.large_image = Some(ImageRequest::square(project.photo.as_str()));
        alert.tap_target = Some(project_target(envelope, project.id.to_string()));
        Some(alert)
    }

    /// 项目动态：项目页作为返回栈根，随后打开动态网页
    pub fn project_update(
        &self,
        envelope: &Arc<PushEnvelope>,
        update: &Update,
    ) -> Option<AlertDescription> {
        let activity = envelope.activity.as_ref()?;
        activity.update_id?;
        let project_id = activity.project_id?;

        let project_hop = NavHop::new(Screen::Project {
            project_param: project_id.to_string(),
        });
        let update_hop = NavHop::new(Screen::WebView {
            url: update.web_url().to_string(),
        })
        .with_envelope(envelope.clone());

        let mut alert = AlertDescription::new(envelope, &self.style);
        alert.large_image = activity.project_photo.as_deref().map(ImageRequest::square);
        alert.tap_target = Some(
            TapTargetBuilder::new(envelope.signature)
                .add_with_parent_stack(project_hop)
                .add(update_hop)
                .build(),
        );
        Some(alert)
    }
}

fn project_target(envelope: &Arc<PushEnvelope>, project_param: String) -> TapTarget {
    let hop = NavHop::new(Screen::Project { project_param }).with_envelope(envelope.clone());
    TapTargetBuilder::new(envelope.signature)
        .add_with_parent_stack(hop)
        .build()
}
