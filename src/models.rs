// 通道数据模型定义
// 包含请求、响应、交易等跨通道共享的规范数据结构

mod common;
mod request;
mod response;
mod transaction;

// 重新导出核心类型
pub use common::*;
pub use request::*;
pub use response::*;
pub use transaction::*;
