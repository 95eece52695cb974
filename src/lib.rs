// 支付通道适配层
// 将规范的交易请求转换为第三方支付通道的报文, 完成签名、发送、验签与结果解析

pub mod channel;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use channel::wechat::WechatProcessor;
pub use channel::{Converter, Cryptor, Processor};
pub use config::{AdapterSettings, ChannelConfig};
pub use error::{ChannelError, ErrorKind, Result};
