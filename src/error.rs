// 通道错误定义
// 区分配置错误、传输错误、验签错误、编码错误与报文错误

use thiserror::Error;

/// 通道适配层统一结果类型
pub type Result<T> = std::result::Result<T, ChannelError>;

/// 通道适配层错误
#[derive(Error, Debug)]
pub enum ChannelError {
    /// 配置缺失或非法 (网络调用之前即失败)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 当前通道不支持的请求类型
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// 与第三方通信失败, 交易结果未知
    #[error("Transport error: {0}")]
    Transport(String),

    /// 成功报文的签名校验失败
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// 字符集不支持或解码失败
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// 报文格式错误
    #[error("Payload error: {0}")]
    Payload(String),

    /// 模板渲染失败
    #[error("Template error: {0}")]
    Template(String),
}

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Integrity,
    Encoding,
    Payload,
}

impl ChannelError {
    /// 获取错误所属分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::Configuration(_) | ChannelError::Unsupported(_) => ErrorKind::Configuration,
            ChannelError::Transport(_) => ErrorKind::Transport,
            ChannelError::Integrity(_) => ErrorKind::Integrity,
            ChannelError::Encoding(_) => ErrorKind::Encoding,
            ChannelError::Payload(_) | ChannelError::Template(_) => ErrorKind::Payload,
        }
    }

    /// 交易结果是否未知 (调用方需通过查询对账)
    pub fn is_outcome_unknown(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl From<tera::Error> for ChannelError {
    fn from(err: tera::Error) -> Self {
        // tera 的错误信息在 source 链中
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ChannelError::Template(message)
    }
}

impl From<roxmltree::Error> for ChannelError {
    fn from(err: roxmltree::Error) -> Self {
        ChannelError::Payload(format!("Malformed XML document: {}", err))
    }
}
