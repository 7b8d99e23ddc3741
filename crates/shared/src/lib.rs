//! 共享库
//!
//! 包含推送分发服务共用的配置、错误处理、信封模型和可观测性等基础设施代码。

pub mod config;
pub mod error;
pub mod events;
pub mod observability;
pub mod test_utils;
