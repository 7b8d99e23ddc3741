//! 异步等待与断言辅助

use std::time::Duration;

/// 轮询等待条件成立，超时返回 false
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// 断言某个 signature 的通知可见
#[macro_export]
macro_rules! assert_visible {
    ($env:expr, $signature:expr) => {
        assert!(
            $env.sink.tray().get($signature).is_some(),
            "signature {} 的通知应该可见",
            $signature
        );
    };
}

/// 断言某个 signature 的通知不可见
#[macro_export]
macro_rules! assert_not_visible {
    ($env:expr, $signature:expr) => {
        assert!(
            $env.sink.tray().get($signature).is_none(),
            "signature {} 的通知不应该可见",
            $signature
        );
    };
}
