//! 推送分发错误类型
//!
//! 定义动态拉取、图片加载和设备注册等场景的错误分类。
//! 这些错误都只在所属通道内部消化：拉取失败丢弃信封，图片失败降级为无图通知，
//! 不会传播到分发总线或其他通道。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("项目动态拉取失败: project={project_param}, update={update_param}, 原因={reason}")]
    UpdateFetchFailed {
        project_param: String,
        update_param: String,
        reason: String,
    },

    #[error("图片加载失败: url={url}, 原因={reason}")]
    ImageLoadFailed { url: String, reason: String },

    #[error("设备注册失败: {0}")]
    RegistrationFailed(String),

    #[error(transparent)]
    Shared(#[from] push_shared::error::PushError),
}

pub type Result<T> = std::result::Result<T, NotificationError>;
