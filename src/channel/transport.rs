// 通道传输层
// 传输客户端抽象、基于 reqwest 的 HTTP 实现, 以及按凭证标识缓存的客户端池

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::{AdapterSettings, ChannelConfig, CredentialIdentity};
use crate::error::{ChannelError, Result};
use crate::utils::crypto::{self, KeyHandle};

const DEFAULT_PRIVATE_KEY_TYPE: &str = "PKCS12";

/// 传输请求
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// 覆盖客户端的总超时时间
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// 创建POST请求
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// 传输响应
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// 是否为 2xx 状态
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输客户端
#[async_trait]
pub trait Transport: Send + Sync {
    /// 发送请求, 网络或读取失败时返回传输错误
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// 传输客户端工厂
pub trait TransportFactory: Send + Sync {
    /// 根据通道配置创建客户端 (需要双向TLS时加载客户端身份)
    fn create(&self, config: &ChannelConfig) -> Result<Arc<dyn Transport>>;
}

/// HTTP传输客户端
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.body(request.body).send().await.map_err(|e| {
            log::error!("HTTP request to {} failed: {}", request.url, e);
            ChannelError::Transport(format!("Failed to send request to {}: {}", request.url, e))
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            log::error!("Failed to read the HTTP entity from {}: {}", request.url, e);
            ChannelError::Transport(format!("Error reading the HTTP entity from response: {}", e))
        })?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// 基于 reqwest 的客户端工厂
pub struct HttpTransportFactory {
    settings: AdapterSettings,
}

impl HttpTransportFactory {
    pub fn new(settings: AdapterSettings) -> Self {
        Self { settings }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self, config: &ChannelConfig) -> Result<Arc<dyn Transport>> {
        let builder = Client::builder()
            .connect_timeout(self.settings.connect_timeout())
            .timeout(self.settings.request_timeout())
            .user_agent(self.settings.user_agent.as_str());

        let builder = match config.private_key.as_deref().filter(|key| !key.trim().is_empty()) {
            Some(private_key) => {
                let key_type = config
                    .private_key_type
                    .as_deref()
                    .unwrap_or(DEFAULT_PRIVATE_KEY_TYPE);
                match crypto::load_identity(key_type, private_key, config.private_key_password.as_deref())? {
                    KeyHandle::Pkcs12(identity) => builder.use_native_tls().identity(identity),
                    KeyHandle::Pem(identity) => builder.use_rustls_tls().identity(identity),
                }
            }
            None => builder,
        };

        let client = builder.build().map_err(|e| {
            ChannelError::Configuration(format!(
                "Failed to build HTTP client for {}: {}",
                config.credential_identity(),
                e
            ))
        })?;

        Ok(Arc::new(HttpTransport::new(client)))
    }
}

/// 传输客户端池
///
/// 以凭证标识为键, 每个标识只创建一次客户端, 创建后不再淘汰。
pub struct ClientCache {
    factory: Arc<dyn TransportFactory>,
    clients: RwLock<HashMap<CredentialIdentity, Arc<dyn Transport>>>,
}

impl ClientCache {
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            factory,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// 获取或创建凭证对应的客户端
    ///
    /// # Arguments
    /// * `config` - 通道配置
    ///
    /// # Returns
    /// * 共享的传输客户端
    pub async fn get_or_create(&self, config: &ChannelConfig) -> Result<Arc<dyn Transport>> {
        let identity = config.credential_identity();

        if let Some(client) = self.clients.read().await.get(&identity) {
            return Ok(Arc::clone(client));
        }

        let mut clients = self.clients.write().await;
        // 等待写锁期间可能已被其他任务创建
        if let Some(client) = clients.get(&identity) {
            return Ok(Arc::clone(client));
        }

        log::info!("Creating transport client for {}", identity);
        let client = self.factory.create(config)?;
        clients.insert(identity, Arc::clone(&client));
        Ok(client)
    }

    /// 已缓存的客户端数量
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
