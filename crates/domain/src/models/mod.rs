//! # 计算资源与处理器模型
//!
//! 处理器（Processor）由计算资源发布的规格声明，客户端只读。
//! 作业提交时会把处理器规格快照一份写入作业，之后处理器的修改不会影响已有作业。

pub mod compute_resource;
pub mod processor;

pub use compute_resource::*;
pub use processor::*;
