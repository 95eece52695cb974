// 加密工具函数
// 提供报文摘要、签名比较以及双向TLS密钥材料加载

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::{ChannelError, Result};

type HmacSha256 = Hmac<Sha256>;

/// 摘要算法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// MD5
    Md5,
    /// SHA-256
    Sha256,
    /// HMAC-SHA256 (以签名密钥为 HMAC 密钥)
    HmacSha256,
}

impl DigestAlgorithm {
    /// 根据配置中的算法名称解析摘要算法
    ///
    /// # Arguments
    /// * `name` - 算法名称, 如 `MD5`、`SHA-256`、`HMAC-SHA256`
    ///
    /// # Returns
    /// * 摘要算法, 不支持时返回配置错误
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "MD5" => Ok(DigestAlgorithm::Md5),
            "SHA-256" | "SHA256" => Ok(DigestAlgorithm::Sha256),
            "HMAC-SHA256" | "HMACSHA256" => Ok(DigestAlgorithm::HmacSha256),
            other => Err(ChannelError::Configuration(format!(
                "Unsupported signature algorithm: {}",
                other
            ))),
        }
    }
}

/// 计算摘要
///
/// # Arguments
/// * `algorithm` - 摘要算法
/// * `key` - 密钥 (仅 HMAC 使用)
/// * `data` - 待计算数据
///
/// # Returns
/// * 摘要字节
pub fn digest(algorithm: DigestAlgorithm, key: &str, data: &[u8]) -> Result<Vec<u8>> {
    match algorithm {
        DigestAlgorithm::Md5 => Ok(md5::compute(data).0.to_vec()),
        DigestAlgorithm::Sha256 => Ok(Sha256::digest(data).to_vec()),
        DigestAlgorithm::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(key.as_bytes())
                .map_err(|e| ChannelError::Configuration(format!("Invalid HMAC key: {}", e)))?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
    }
}

/// 计算摘要并编码为大写十六进制字符串
pub fn digest_hex_upper(algorithm: DigestAlgorithm, key: &str, data: &[u8]) -> Result<String> {
    Ok(hex::encode_upper(digest(algorithm, key, data)?))
}

/// 忽略大小写的常量时间字符串比较
///
/// # Arguments
/// * `a` - 字符串A
/// * `b` - 字符串B
///
/// # Returns
/// * 字符串是否相等
pub fn constant_time_eq_ignore_case(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.bytes().zip(b.bytes()) {
        result |= byte_a.to_ascii_uppercase() ^ byte_b.to_ascii_uppercase();
    }

    result == 0
}

/// 已加载的客户端身份
///
/// PKCS12 需要 native-tls 后端, PEM 需要 rustls 后端
pub enum KeyHandle {
    Pkcs12(reqwest::Identity),
    Pem(reqwest::Identity),
}

/// 加载双向TLS客户端身份
///
/// # Arguments
/// * `key_type` - 密钥类型 (`PKCS12` / `PEM`)
/// * `content` - Base64编码的密钥内容
/// * `password` - 密钥密码 (PKCS12 使用)
///
/// # Returns
/// * 客户端身份
pub fn load_identity(key_type: &str, content: &str, password: Option<&str>) -> Result<KeyHandle> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(content.trim())
        .map_err(|e| ChannelError::Configuration(format!("Invalid base64 key material: {}", e)))?;

    match key_type.trim().to_ascii_uppercase().as_str() {
        "PKCS12" | "P12" => {
            let identity = reqwest::Identity::from_pkcs12_der(&decoded, password.unwrap_or_default())
                .map_err(|e| ChannelError::Configuration(format!("Failed to load PKCS12 key store: {}", e)))?;
            Ok(KeyHandle::Pkcs12(identity))
        }
        "PEM" => {
            let identity = reqwest::Identity::from_pem(&decoded)
                .map_err(|e| ChannelError::Configuration(format!("Failed to load PEM key pair: {}", e)))?;
            Ok(KeyHandle::Pem(identity))
        }
        other => Err(ChannelError::Configuration(format!(
            "Unsupported private key type: {}",
            other
        ))),
    }
}
