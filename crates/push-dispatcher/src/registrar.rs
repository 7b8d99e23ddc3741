//! 设备注册
//!
//! 分发总线初始化时向推送后端注册一次设备，结果不影响通道的启动。

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::error::{NotificationError, Result};

/// 设备注册接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRegistrar: Send + Sync {
    async fn register_device(&self) -> Result<()>;
}

/// 模拟设备注册器
///
/// 只记录日志。生产环境中替换为 FCM 令牌获取并上报到后端的实现。
pub struct LoggingDeviceRegistrar {
    device_name: String,
}

impl LoggingDeviceRegistrar {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
        }
    }
}

#[async_trait]
impl DeviceRegistrar for LoggingDeviceRegistrar {
    async fn register_device(&self) -> Result<()> {
        if self.device_name.trim().is_empty() {
            return Err(NotificationError::RegistrationFailed(
                "设备名称为空".to_string(),
            ));
        }

        info!(
            device = %self.device_name,
            registered_at = %Utc::now().to_rfc3339(),
            "模拟注册推送设备"
        );
        Ok(())
    }
}
