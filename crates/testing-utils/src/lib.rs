//! # Dendro Testing Utils
//!
//! 各 crate 共用的测试工具。
//!
//! - **MockDendroApi**: 内存中的远程服务替身，支持逐次延迟、失败注入和调用计数
//! - **MockKeyValueStore**: 内存键值存储，可模拟写入失败
//! - **Builders**: 作业、项目、处理器、计算资源的测试数据构造器
//! - **Helpers**: 异步等待等通用辅助
//!
//! ```toml
//! [dev-dependencies]
//! dendro-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
