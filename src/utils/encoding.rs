// 字符集工具
// 按通道配置的字符集编码请求报文、解码响应报文

use encoding_rs::Encoding;

use crate::error::{ChannelError, Result};

/// 根据字符集名称查找编码
pub fn lookup(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ChannelError::Encoding(format!("Unsupported encoding: {}", label)))
}

/// 按指定字符集编码文本
///
/// 文本中存在该字符集无法表示的字符时返回编码错误
pub fn encode(text: &str, label: &str) -> Result<Vec<u8>> {
    let encoding = lookup(label)?;
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(ChannelError::Encoding(format!(
            "Text cannot be represented in {}",
            encoding.name()
        )));
    }
    Ok(bytes.into_owned())
}

/// 按指定字符集解码字节
pub fn decode(bytes: &[u8], label: &str) -> Result<String> {
    let encoding = lookup(label)?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(ChannelError::Encoding(format!(
            "Response body is not valid {}",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}
