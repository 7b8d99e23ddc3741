//! 分发链路测试套件
//!
//! 每类通知从提交到渲染的完整链路。

use crate::helpers::*;
use crate::setup::TestEnvironment;
use crate::{assert_not_visible, assert_visible};
use push_dispatcher::images::{ImageRequest, ImageTransform};
use push_dispatcher::navigation::Screen;
use push_shared::events::{ActivityCategory, PushEnvelope};
use push_shared::test_utils::*;

fn project(param: &str) -> Screen {
    Screen::Project {
        project_param: param.to_string(),
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    /// 项目活动：封面正方形裁剪，点击进入项目页
    #[tokio::test]
    async fn test_project_activity_end_to_end() {
        let env = TestEnvironment::setup();

        env.bus.submit(
            EnvelopeBuilder::new(42)
                .gcm("Funded!", "Project X reached its goal")
                .activity(ActivityCategory::Success)
                .project_id(7)
                .project_photo("http://x/p.jpg")
                .build(),
        );
        env.bus.drain().await;

        assert_eq!(env.sink.render_count(), 1);
        let rendered = env.sink.last_for(42).expect("应渲染 signature 42");
        assert_eq!(rendered.alert.title, "Funded!");
        assert_eq!(rendered.alert.body, "Project X reached its goal");
        assert_eq!(
            rendered.alert.large_image,
            Some(ImageRequest::square("http://x/p.jpg"))
        );
        let icon = rendered.large_icon.expect("应加载大图");
        assert_eq!(icon.transforms, vec![ImageTransform::CropSquare]);

        let target = rendered.alert.tap_target.expect("应有跳转目标");
        assert_eq!(target.request_code, 42);
        assert!(target.update_current);
        assert_eq!(target.screens(), vec![&project("7")]);
        assert_eq!(env.client.fetch_count(), 0);
    }

    /// 项目动态：先拉取 Update，目标为项目页 + 动态网页
    #[tokio::test]
    async fn test_project_update_end_to_end() {
        let env = TestEnvironment::setup();

        env.bus.submit(project_update_envelope(9, 3, 5));
        env.bus.drain().await;

        assert_eq!(env.client.fetch_count(), 1);
        assert_eq!(env.sink.rendered_signatures(), vec![9]);

        let rendered = env.sink.last_for(9).expect("应渲染 signature 9");
        let target = rendered.alert.tap_target.expect("应有跳转目标");
        assert_eq!(
            target.screens(),
            vec![
                &project("3"),
                &Screen::WebView {
                    url: update_web_url("3", "5"),
                },
            ]
        );
        // 返回栈以发现页为根
        assert_eq!(target.back_stack().first(), Some(&&Screen::Discovery));
    }

    /// 项目提醒：使用提醒负载中的项目 id 和封面
    #[tokio::test]
    async fn test_project_reminder_end_to_end() {
        let env = TestEnvironment::setup();

        env.bus.submit(project_reminder_envelope(5, 12));
        env.bus.drain().await;

        let rendered = env.sink.last_for(5).expect("应渲染 signature 5");
        assert_eq!(rendered.alert.title, "Last call");
        assert_eq!(
            rendered.alert.large_image,
            Some(ImageRequest::square("http://x/cover.jpg"))
        );
        let target = rendered.alert.tap_target.expect("应有跳转目标");
        assert_eq!(target.destination(), Some(&project("12")));
    }

    /// 好友关注：圆形头像，无跳转目标
    #[tokio::test]
    async fn test_friend_follow_end_to_end() {
        let env = TestEnvironment::setup();

        env.bus.submit(friend_follow_envelope(1));
        env.bus.drain().await;

        let rendered = env.sink.last_for(1).expect("应渲染 signature 1");
        assert!(rendered.alert.tap_target.is_none());
        let icon = rendered.large_icon.expect("应加载头像");
        assert_eq!(
            icon.transforms,
            vec![ImageTransform::CropSquare, ImageTransform::Circle]
        );
    }

    /// 从原始 JSON 负载进入
    #[tokio::test]
    async fn test_json_payload_end_to_end() {
        let env = TestEnvironment::setup();

        let payload = br#"{
            "signature": 77,
            "gcm": {"title": "New backer", "alert": "Grace backed Project X"},
            "activity": {
                "category": "backing",
                "id": 1001,
                "project_id": 8,
                "project_photo": "http://x/p8.jpg"
            }
        }"#;
        let envelope = PushEnvelope::from_json(payload).expect("负载应合法");
        env.bus.submit(envelope);
        env.bus.drain().await;

        assert_visible!(env, 77);
        let rendered = env.sink.last_for(77).expect("应渲染 signature 77");
        assert_eq!(rendered.alert.body, "Grace backed Project X");
    }
}

#[cfg(test)]
mod classification_tests {
    use super::*;

    /// 不属于任何类别的信封不产生任何通知
    #[tokio::test]
    async fn test_unclassified_envelopes_render_nothing() {
        let env = TestEnvironment::setup();

        env.bus.submit(EnvelopeBuilder::new(1).gcm("Hi", "there").build());
        env.bus.submit(
            EnvelopeBuilder::new(2)
                .activity(ActivityCategory::Watch)
                .project_id(3)
                .build(),
        );
        env.bus.submit(
            EnvelopeBuilder::new(3)
                .activity(ActivityCategory::CommentProject)
                .build(),
        );
        env.bus.drain().await;

        assert_eq!(env.sink.render_count(), 0);
        assert_eq!(env.client.fetch_count(), 0);
        assert_eq!(env.images.load_count(), 0);
    }

    /// 每个合法信封恰好渲染一次
    #[tokio::test]
    async fn test_each_envelope_renders_exactly_once() {
        let env = TestEnvironment::setup();

        env.bus.submit(friend_follow_envelope(1));
        env.bus.submit(project_activity_envelope(2, 7));
        env.bus.submit(project_reminder_envelope(3, 8));
        env.bus.submit(project_update_envelope(4, 9, 10));
        env.bus.drain().await;

        let mut signatures = env.sink.rendered_signatures();
        signatures.sort_unstable();
        assert_eq!(signatures, vec![1, 2, 3, 4]);
    }

    /// N 个不同 signature 产生 N 条可见通知
    #[tokio::test]
    async fn test_distinct_signatures_are_all_visible() {
        let env = TestEnvironment::setup();

        for signature in 100..120 {
            env.bus.submit(project_activity_envelope(signature, 7));
        }
        env.bus.drain().await;

        assert_eq!(env.sink.tray().visible_count(), 20);
        assert_eq!(
            env.sink.tray().visible_signatures(),
            (100..120).collect::<Vec<_>>()
        );
    }

    /// 相同 signature 后到的通知替换先到的
    #[tokio::test]
    async fn test_same_signature_replaces_visible_alert() {
        let env = TestEnvironment::setup();

        env.bus.submit(project_activity_envelope(42, 7));
        env.bus.submit(
            EnvelopeBuilder::new(42)
                .gcm("Funded again", "Stretch goal reached")
                .activity(ActivityCategory::Success)
                .project_id(7)
                .build(),
        );
        env.bus.drain().await;

        assert_eq!(env.sink.render_count(), 2);
        assert_eq!(env.sink.tray().visible_count(), 1);
        let entry = env.sink.tray().get(42).expect("应可见");
        assert_eq!(entry.revision, 2);
        assert_eq!(entry.notification.alert.title, "Funded again");
        assert_not_visible!(env, 43);
    }
}
