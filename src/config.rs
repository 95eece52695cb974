// 配置管理模块
// 通道运行时配置 (每通道每商户一份) 与适配层自身的运行参数

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{ChannelError, Result};
use crate::models::ChannelType;
use crate::utils::mask;

/// 银行映射 (平台银行简称 -> 通道银行标识)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankMapping {
    /// 通道银行编码
    pub bank_code: String,
    /// 通道银行名称
    pub bank_name: Option<String>,
}

/// 通道配置
///
/// 加载后不可变, 以 `Arc<ChannelConfig>` 的形式在请求之间共享。
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelConfig {
    /// 通道编号
    pub channel_no: String,
    /// 通道类型
    pub channel_type: Option<ChannelType>,

    /// 接口基础地址
    pub base_url: String,
    /// 异步通知回调地址
    pub callback_url: Option<String>,
    /// 查询地址
    pub query_url: Option<String>,
    /// 前端跳转地址
    pub return_url: Option<String>,

    /// 报文字符集
    pub encoding: String,

    /// 商户号
    pub merchant_no: String,
    /// 登录用户名
    pub username: Option<String>,
    /// 登录密码
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// 私钥类型 (PKCS12 / PEM)
    pub private_key_type: Option<String>,
    /// 私钥内容 (Base64)
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
    /// 私钥密码
    #[serde(skip_serializing)]
    pub private_key_password: Option<String>,
    /// 公钥类型
    pub public_key_type: Option<String>,
    /// 公钥内容
    pub public_key: Option<String>,
    /// 签名算法
    pub signature_algorithm: String,

    /// 应用ID
    pub app_id: String,
    /// 签名密钥
    #[serde(skip_serializing)]
    pub secret_key: String,

    /// 银行映射
    pub bank_mappings: HashMap<String, BankMapping>,
}

/// 凭证标识 (决定使用哪套密钥/证书以及哪个传输客户端)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialIdentity {
    pub channel_type: Option<ChannelType>,
    pub channel_no: String,
    pub merchant_no: String,
}

impl fmt::Display for CredentialIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel_type = self.channel_type.map(|t| t.name()).unwrap_or("UNKNOWN");
        write!(f, "{}-{}-{}", channel_type, self.channel_no, self.merchant_no)
    }
}

/// 配置字段名 (用于必填校验)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    ChannelNo,
    BaseUrl,
    CallbackUrl,
    Encoding,
    MerchantNo,
    PrivateKey,
    SignatureAlgorithm,
    AppId,
    SecretKey,
}

impl ChannelConfig {
    /// 从JSON记录解析通道配置
    ///
    /// # Arguments
    /// * `content` - JSON字符串 (字段名为 camelCase)
    ///
    /// # Returns
    /// * 通道配置
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| ChannelError::Configuration(format!("Invalid channel config: {}", e)))
    }

    /// 获取凭证标识
    pub fn credential_identity(&self) -> CredentialIdentity {
        CredentialIdentity {
            channel_type: self.channel_type,
            channel_no: self.channel_no.clone(),
            merchant_no: self.merchant_no.clone(),
        }
    }

    /// 查询银行映射
    pub fn bank_mapping(&self, bank_acronym: &str) -> Option<&BankMapping> {
        self.bank_mappings.get(bank_acronym)
    }

    fn field_value(&self, field: ConfigField) -> Option<&str> {
        match field {
            ConfigField::ChannelNo => Some(self.channel_no.as_str()),
            ConfigField::BaseUrl => Some(self.base_url.as_str()),
            ConfigField::CallbackUrl => self.callback_url.as_deref(),
            ConfigField::Encoding => Some(self.encoding.as_str()),
            ConfigField::MerchantNo => Some(self.merchant_no.as_str()),
            ConfigField::PrivateKey => self.private_key.as_deref(),
            ConfigField::SignatureAlgorithm => Some(self.signature_algorithm.as_str()),
            ConfigField::AppId => Some(self.app_id.as_str()),
            ConfigField::SecretKey => Some(self.secret_key.as_str()),
        }
    }

    /// 校验必填字段
    ///
    /// # Arguments
    /// * `fields` - 通道要求的必填字段
    ///
    /// # Returns
    /// * 任一字段缺失时返回配置错误
    pub fn require(&self, fields: &[ConfigField]) -> Result<()> {
        let missing: Vec<String> = fields
            .iter()
            .filter(|field| self.field_value(**field).map_or(true, |v| v.trim().is_empty()))
            .map(|field| format!("{:?}", field))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ChannelError::Configuration(format!(
                "Missing required config fields for {}: {}",
                self.credential_identity(),
                missing.join(", ")
            )))
        }
    }
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = |value: Option<&str>| value.map(mask::mask_all);

        f.debug_struct("ChannelConfig")
            .field("channel_no", &self.channel_no)
            .field("channel_type", &self.channel_type)
            .field("base_url", &self.base_url)
            .field("callback_url", &self.callback_url)
            .field("query_url", &self.query_url)
            .field("return_url", &self.return_url)
            .field("encoding", &self.encoding)
            .field("merchant_no", &self.merchant_no)
            .field("username", &self.username)
            .field("password", &secret(self.password.as_deref()))
            .field("private_key_type", &self.private_key_type)
            .field("private_key", &secret(self.private_key.as_deref()))
            .field("private_key_password", &secret(self.private_key_password.as_deref()))
            .field("public_key_type", &self.public_key_type)
            .field("signature_algorithm", &self.signature_algorithm)
            .field("app_id", &self.app_id)
            .field("secret_key", &secret(Some(self.secret_key.as_str())))
            .field("bank_mappings", &self.bank_mappings.len())
            .finish()
    }
}

/// 适配层运行参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterSettings {
    /// 连接超时时间 (秒)
    pub connect_timeout: u64,
    /// 请求总超时时间 (秒)
    pub request_timeout: u64,
    /// HTTP User-Agent
    pub user_agent: String,
}

impl AdapterSettings {
    /// 从环境变量加载运行参数
    pub fn from_env() -> AnyResult<Self> {
        dotenv::dotenv().ok(); // 加载.env文件，忽略错误

        Ok(AdapterSettings {
            connect_timeout: env::var("CHANNEL_CONNECT_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid CHANNEL_CONNECT_TIMEOUT")?,
            request_timeout: env::var("CHANNEL_REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid CHANNEL_REQUEST_TIMEOUT")?,
            user_agent: env::var("CHANNEL_USER_AGENT")
                .unwrap_or_else(|_| "WoPay-Channel/1.0".to_string()),
        })
    }

    /// 验证运行参数的有效性
    pub fn validate(&self) -> AnyResult<()> {
        if self.connect_timeout == 0 {
            anyhow::bail!("Connect timeout cannot be 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("Request timeout cannot be 0");
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        AdapterSettings {
            connect_timeout: 30,
            request_timeout: 30,
            user_agent: "WoPay-Channel/1.0".to_string(),
        }
    }
}
