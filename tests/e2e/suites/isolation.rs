//! 故障隔离测试套件
//!
//! 单个信封或单条通道的失败和延迟不影响其他信封和通道。

use std::time::Duration;

use crate::assert_visible;
use crate::setup::TestEnvironment;
use push_shared::events::ActivityCategory;
use push_shared::test_utils::*;

#[cfg(test)]
mod failure_tests {
    use super::*;

    /// 缺少 update_id 的动态信封不发起拉取也不渲染
    #[tokio::test]
    async fn test_update_without_update_id_never_fetches() {
        let env = TestEnvironment::setup();

        env.bus.submit(
            EnvelopeBuilder::new(9)
                .gcm("Update", "Missing id")
                .activity(ActivityCategory::Update)
                .project_id(3)
                .build(),
        );
        env.bus.submit(friend_follow_envelope(1));
        env.bus.drain().await;

        assert_eq!(env.client.fetch_count(), 0);
        assert_eq!(env.sink.rendered_signatures(), vec![1]);
    }

    /// 拉取失败只丢弃该信封，后续信封照常处理
    #[tokio::test]
    async fn test_failed_fetch_does_not_block_later_updates() {
        let env = TestEnvironment::setup();
        env.client.fail_update("5");

        env.bus.submit(project_update_envelope(9, 3, 5));
        env.bus.submit(project_update_envelope(10, 3, 6));
        env.bus.submit(project_activity_envelope(11, 3));
        env.bus.drain().await;

        assert_eq!(env.client.fetch_count(), 2);
        let mut signatures = env.sink.rendered_signatures();
        signatures.sort_unstable();
        assert_eq!(signatures, vec![10, 11]);
    }

    /// 大图加载失败时仍渲染无图通知
    #[tokio::test]
    async fn test_image_failure_still_renders() {
        let env = TestEnvironment::setup();
        env.images.fail_url("http://x/p.jpg");

        env.bus.submit(project_activity_envelope(42, 7));
        env.bus.drain().await;

        assert_visible!(env, 42);
        let rendered = env.sink.last_for(42).expect("应渲染 signature 42");
        assert!(rendered.large_icon.is_none());
        assert!(rendered.alert.large_image.is_some());
    }

    /// 缺少 project_id 的项目活动被丢弃，不影响同批其他信封
    #[tokio::test]
    async fn test_malformed_envelope_is_isolated() {
        let env = TestEnvironment::setup();

        env.bus.submit(
            EnvelopeBuilder::new(1)
                .activity(ActivityCategory::Launch)
                .project_photo("http://x/p.jpg")
                .build(),
        );
        env.bus.submit(project_activity_envelope(2, 7));
        env.bus.drain().await;

        assert_eq!(env.sink.rendered_signatures(), vec![2]);
    }
}

#[cfg(test)]
mod latency_tests {
    use super::*;

    /// 一条通道卡在慢请求上，其他通道照常推进
    #[tokio::test]
    async fn test_slow_lane_does_not_block_other_lanes() {
        let env = TestEnvironment::setup();
        env.images.delay_url("http://x/ada.jpg", Duration::from_secs(30));

        env.bus.submit(friend_follow_envelope(1));
        env.bus.submit(project_activity_envelope(2, 7));
        env.bus.submit(project_reminder_envelope(3, 8));

        assert!(env.wait_for_renders(2).await, "其他通道应在超时前完成");
        let mut signatures = env.sink.rendered_signatures();
        signatures.sort_unstable();
        assert_eq!(signatures, vec![2, 3]);

        env.bus.shutdown();
    }

    /// 动态拉取并发进行，完成顺序决定渲染顺序
    #[tokio::test]
    async fn test_update_fetches_complete_out_of_order() {
        let env = TestEnvironment::setup();
        env.client.delay_update("5", Duration::from_millis(300));

        env.bus.submit(project_update_envelope(9, 3, 5));
        env.bus.submit(project_update_envelope(10, 3, 6));
        env.bus.drain().await;

        assert_eq!(env.sink.rendered_signatures(), vec![10, 9]);
    }

    /// 慢拉取不阻塞同通道后续信封的拉取
    #[tokio::test]
    async fn test_slow_fetch_does_not_block_update_lane() {
        let env = TestEnvironment::setup();
        env.client.delay_update("5", Duration::from_secs(30));

        env.bus.submit(project_update_envelope(9, 3, 5));
        env.bus.submit(project_update_envelope(10, 3, 6));

        assert!(env.wait_for_signature(10).await, "后续动态应在超时前渲染");
        assert_eq!(env.sink.render_count(), 1);

        env.bus.shutdown();
    }
}
