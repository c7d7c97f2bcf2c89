//! 内存存储实现模块
//!
//! 仅用于本地运行和测试。

pub mod observation;

pub use observation::*;
