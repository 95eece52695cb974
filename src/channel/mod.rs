// 通道适配层
// 转换器 (规范模型 <-> 通道报文)、加解密器 (签名/验签)、处理器 (完整的一次通道调用)

pub mod template;
pub mod transport;
pub mod wechat;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::models::{Request, RequestType, Response};

pub use template::{TemplateRenderer, TeraRenderer};
pub use transport::{
    ClientCache, HttpTransport, HttpTransportFactory, Transport, TransportFactory, TransportRequest,
    TransportResponse,
};

fn unsupported(what: &str) -> ChannelError {
    ChannelError::Unsupported(format!("{} is not supported by this channel", what))
}

/// 报文转换器
///
/// `write_to`/`read_from` 按请求类型分派, 通道只需实现自己支持的类型,
/// 其余类型保持默认实现 (返回不支持错误)。
#[allow(clippy::wrong_self_convention)]
pub trait Converter: Send + Sync {
    /// 将请求转换为通道报文
    fn write_to(&self, request: &Request) -> Result<String> {
        match request.request_type() {
            RequestType::Transaction => self.from_transaction(request),
            RequestType::TransactionQuery => self.from_transaction_query(request),
            RequestType::TransactionNotification => self.from_transaction_notification(request),
        }
    }

    /// 将通道报文转换为响应
    fn read_from(&self, content: &str, request: &Request) -> Result<Response> {
        match request.request_type() {
            RequestType::Transaction => self.to_transaction_response(content, request),
            RequestType::TransactionQuery => self.to_transaction_query_response(content, request),
            RequestType::TransactionNotification => {
                self.to_transaction_notification_response(content, request)
            }
        }
    }

    fn from_transaction(&self, _request: &Request) -> Result<String> {
        Err(unsupported("Transaction"))
    }

    fn from_transaction_query(&self, _request: &Request) -> Result<String> {
        Err(unsupported("Transaction query"))
    }

    fn from_transaction_notification(&self, _request: &Request) -> Result<String> {
        Err(unsupported("Transaction notification"))
    }

    fn to_transaction_response(&self, _content: &str, _request: &Request) -> Result<Response> {
        Err(unsupported("Transaction response"))
    }

    fn to_transaction_query_response(&self, _content: &str, _request: &Request) -> Result<Response> {
        Err(unsupported("Transaction query response"))
    }

    fn to_transaction_notification_response(
        &self,
        _content: &str,
        _request: &Request,
    ) -> Result<Response> {
        Err(unsupported("Transaction notification response"))
    }
}

/// 报文加解密器
pub trait Cryptor: Send + Sync {
    /// 对报文签名, 返回签名后的报文
    fn sign(&self, _content: &str, _config: &ChannelConfig) -> Result<String> {
        Err(unsupported("Signing"))
    }

    /// 校验报文签名, 校验失败返回完整性错误
    fn verify(&self, _content: &str, _config: &ChannelConfig) -> Result<()> {
        Err(unsupported("Verification"))
    }
}

/// 通道处理器
///
/// 处理器实例在并发调用方之间共享。
#[async_trait]
pub trait Processor: Send + Sync {
    /// 执行一次通道调用: 转换、签名、发送、验签、解析
    ///
    /// 签名后的报文会写回 `request.content`
    async fn execute(&self, _request: &mut Request) -> Result<Response> {
        Err(unsupported("Execute"))
    }

    /// 处理通道异步通知, 返回通知响应
    fn handle(&self, _notification: &str, _request: &Request) -> Result<Response> {
        Err(unsupported("Notification handling"))
    }

    /// 将通道异步通知转换为交易通知请求
    fn receive(&self, _notification: &str, _config: Arc<ChannelConfig>) -> Result<Request> {
        Err(unsupported("Notification receiving"))
    }

    /// 生成回复给通道的通知应答报文
    fn acknowledge(&self, _request: &Request) -> Result<String> {
        Err(unsupported("Notification acknowledgment"))
    }
}
