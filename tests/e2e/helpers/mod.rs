//! 测试辅助工具模块
//!
//! 提供可编排的替身协作方和异步等待工具。

mod assertions;

pub use assertions::*;
pub use fakes::*;
