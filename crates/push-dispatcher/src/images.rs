//! 通知大图加载
//!
//! `ImageLoader` 抽象"下载并按遮罩变换"的外部图片服务。实际的像素变换
//! 由平台图片库完成，这里下载原始字节并记录需要应用的变换序列。

use std::time::Duration;

use async_trait::async_trait;
use push_shared::config::ImageConfig;
use push_shared::error::PushError;
use tracing::debug;

use crate::error::{NotificationError, Result};

/// 图片变换
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTransform {
    /// 居中裁剪为正方形
    CropSquare,
    /// 圆形遮罩，用于用户头像
    Circle,
}

/// 大图请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub url: String,
    /// 按顺序应用的变换
    pub transforms: Vec<ImageTransform>,
}

impl ImageRequest {
    /// 正方形裁剪（项目封面）
    pub fn square(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transforms: vec![ImageTransform::CropSquare],
        }
    }

    /// 正方形裁剪后加圆形遮罩（用户头像）
    pub fn circle(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transforms: vec![ImageTransform::CropSquare, ImageTransform::Circle],
        }
    }

    pub fn is_circular(&self) -> bool {
        self.transforms.contains(&ImageTransform::Circle)
    }
}

/// 已加载的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub transforms: Vec<ImageTransform>,
}

/// 图片加载服务
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, request: &ImageRequest) -> Result<Bitmap>;
}

/// 基于 HTTP 下载的图片加载器
pub struct HttpImageLoader {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageLoader {
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(PushError::from)?;
        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }

    fn failed(request: &ImageRequest, reason: impl ToString) -> NotificationError {
        NotificationError::ImageLoadFailed {
            url: request.url.clone(),
            reason: reason.to_string(),
        }
    }

    fn too_large(&self, request: &ImageRequest, size: u64) -> NotificationError {
        Self::failed(
            request,
            format!("图片大小 {} 超过上限 {}", size, self.max_bytes),
        )
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, request: &ImageRequest) -> Result<Bitmap> {
        let mut response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| Self::failed(request, e))?
            .error_for_status()
            .map_err(|e| Self::failed(request, e))?;

        if let Some(length) = response.content_length()
            && length > self.max_bytes as u64
        {
            return Err(self.too_large(request, length));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // 分块读取，超过上限立即停止，不把整个响应体读入内存
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::failed(request, e))?
        {
            let size = bytes.len() + chunk.len();
            if size > self.max_bytes {
                return Err(self.too_large(request, size as u64));
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(url = %request.url, size = bytes.len(), "图片下载完成");

        Ok(Bitmap {
            url: request.url.clone(),
            content_type,
            bytes,
            transforms: request.transforms.clone(),
        })
    }
}
