//! 推送分发端到端测试
//!
//! 以内存中的替身协作方组装完整的分发总线，覆盖：
//! - 四类通知的完整链路（分类、补全、展示构建、渲染）
//! - 残缺信封和补全失败的静默丢弃
//! - 通道之间的故障与延迟隔离
//! - 初始化和关闭的生命周期

pub mod helpers;
pub mod setup;
pub mod suites;

pub use setup::TestEnvironment;
