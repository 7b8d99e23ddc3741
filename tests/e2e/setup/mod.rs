//! 测试环境
//!
//! 用替身协作方组装一条完整的分发总线。

use std::sync::Arc;
use std::time::Duration;

use push_dispatcher::{AlertPresenter, Collaborators, PushNotifications};
use push_shared::config::DispatcherConfig;

use crate::helpers::{
    CountingRegistrar, FakeImageLoader, FakeUpdateClient, RecordingSink, wait_until,
};

/// 默认等待时长
pub const WAIT: Duration = Duration::from_secs(2);

pub struct TestEnvironment {
    pub bus: PushNotifications,
    pub sink: Arc<RecordingSink>,
    pub client: Arc<FakeUpdateClient>,
    pub images: Arc<FakeImageLoader>,
    pub registrar: Arc<CountingRegistrar>,
}

impl TestEnvironment {
    /// 组装并初始化分发总线
    pub fn setup() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// 组装但不初始化
    pub fn uninitialized(config: DispatcherConfig) -> Self {
        let sink = Arc::new(RecordingSink::new());
        let client = Arc::new(FakeUpdateClient::new());
        let images = Arc::new(FakeImageLoader::new());
        let registrar = Arc::new(CountingRegistrar::default());

        let bus = PushNotifications::new(
            Collaborators {
                client: client.clone(),
                images: images.clone(),
                sink: sink.clone(),
                registrar: registrar.clone(),
            },
            AlertPresenter::default(),
            config,
        );

        Self {
            bus,
            sink,
            client,
            images,
            registrar,
        }
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        let env = Self::uninitialized(config);
        env.bus.initialize();
        env
    }

    /// 等待渲染次数达到期望值
    pub async fn wait_for_renders(&self, expected: usize) -> bool {
        let sink = self.sink.clone();
        wait_until(WAIT, move || sink.render_count() >= expected).await
    }

    /// 等待某个 signature 被渲染
    pub async fn wait_for_signature(&self, signature: i32) -> bool {
        let sink = self.sink.clone();
        wait_until(WAIT, move || sink.tray().get(signature).is_some()).await
    }
}
