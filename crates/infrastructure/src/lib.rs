//! 外部协作者的具体实现
//!
//! - [`http_api::HttpDendroApi`]: 基于 reqwest 的远程 Dendro 服务客户端
//! - [`storage`]: 本地键值存储（JSON 文件、内存）

pub mod http_api;
pub mod storage;

pub use http_api::{HttpDendroApi, API_KEY_HEADER};
pub use storage::{InMemoryStore, JsonFileStore};
