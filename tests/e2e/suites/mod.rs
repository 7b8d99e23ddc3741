//! 测试套件模块
//!
//! 按行为组织的测试用例集合。

pub mod dispatch;
pub mod isolation;
