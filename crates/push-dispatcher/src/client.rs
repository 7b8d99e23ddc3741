//! 项目动态拉取客户端
//!
//! 动态通知只携带 project_id / update_id，跳转所需的网页地址需要
//! 再向后端拉取一次完整的 Update 资源。

use std::time::Duration;

use async_trait::async_trait;
use push_shared::config::ApiConfig;
use push_shared::error::PushError;
use push_shared::events::Update;
use tracing::debug;

use crate::error::{NotificationError, Result};

/// 项目动态拉取接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateClient: Send + Sync {
    async fn fetch_update(&self, project_param: &str, update_param: &str) -> Result<Update>;
}

/// 基于 HTTP 的后端 API 客户端
pub struct HttpUpdateClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpUpdateClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(PushError::from)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn update_url(&self, project_param: &str, update_param: &str) -> String {
        format!(
            "{}/v1/projects/{}/updates/{}",
            self.base_url, project_param, update_param
        )
    }
}

#[async_trait]
impl UpdateClient for HttpUpdateClient {
    async fn fetch_update(&self, project_param: &str, update_param: &str) -> Result<Update> {
        let failed = |reason: String| NotificationError::UpdateFetchFailed {
            project_param: project_param.to_string(),
            update_param: update_param.to_string(),
            reason,
        };

        let url = self.update_url(project_param, update_param);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?
            .error_for_status()
            .map_err(|e| failed(e.to_string()))?;

        let update = response
            .json::<Update>()
            .await
            .map_err(|e| failed(e.to_string()))?;

        debug!(url = %url, update_id = update.id, "项目动态拉取完成");
        Ok(update)
    }
}
