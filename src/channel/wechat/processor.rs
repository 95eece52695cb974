// 微信通道处理器
// 转换 -> 签名 -> 发送 -> 验签 -> 解析

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{WechatConverter, WechatCryptor};
use crate::channel::{
    ClientCache, Converter, Cryptor, HttpTransportFactory, Processor, TeraRenderer,
    TransportRequest,
};
use crate::config::{AdapterSettings, ChannelConfig, ConfigField};
use crate::error::{ChannelError, Result};
use crate::models::{ChannelType, Request, RequestType, Response};
use crate::utils::encoding;

const URL_UNIFIED_ORDER: &str = "/unifiedorder";
const URL_ORDER_QUERY: &str = "/orderquery";

/// 请求类型 -> 接口路径
const ROUTES: &[(RequestType, &str)] = &[
    (RequestType::Transaction, URL_UNIFIED_ORDER),
    (RequestType::TransactionQuery, URL_ORDER_QUERY),
];

const HEADER_CONTENT_TYPE: &str = "Content-Type";
const CONTENT_TYPE_XML: &str = "text/xml; charset=utf8";

const REQUIRED_FIELDS: &[ConfigField] = &[
    ConfigField::BaseUrl,
    ConfigField::AppId,
    ConfigField::MerchantNo,
    ConfigField::SecretKey,
    ConfigField::SignatureAlgorithm,
    ConfigField::Encoding,
];

/// 微信通道处理器
pub struct WechatProcessor {
    converter: WechatConverter,
    cryptor: WechatCryptor,
    clients: Arc<ClientCache>,
}

impl WechatProcessor {
    pub fn new(converter: WechatConverter, cryptor: WechatCryptor, clients: Arc<ClientCache>) -> Self {
        Self {
            converter,
            cryptor,
            clients,
        }
    }

    /// 使用内置模板和HTTP传输创建处理器
    pub fn with_settings(settings: AdapterSettings) -> Result<Self> {
        let renderer = Arc::new(TeraRenderer::new()?);
        let factory = Arc::new(HttpTransportFactory::new(settings));
        Ok(Self::new(
            WechatConverter::new(renderer),
            WechatCryptor::new(),
            Arc::new(ClientCache::new(factory)),
        ))
    }

    fn route(request_type: RequestType) -> Result<&'static str> {
        ROUTES
            .iter()
            .find(|(route_type, _)| *route_type == request_type)
            .map(|(_, path)| *path)
            .ok_or_else(|| {
                ChannelError::Configuration(format!(
                    "Request type {:?} not supported by WeChat Pay",
                    request_type
                ))
            })
    }

    fn url(config: &ChannelConfig, path: &str) -> String {
        format!("{}{}", config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Processor for WechatProcessor {
    async fn execute(&self, request: &mut Request) -> Result<Response> {
        let config = Arc::clone(request.config()?);
        config.require(REQUIRED_FIELDS)?;
        let request_type = request.request_type();
        let path = Self::route(request_type)?;

        let content = self.converter.write_to(request)?;
        let signed = self.cryptor.sign(&content, &config)?;
        log::debug!("Signed string: {}", signed);
        request.content = Some(signed.clone());

        let url = Self::url(&config, path);
        let body = encoding::encode(&signed, &config.encoding)?;
        let transport = self.clients.get_or_create(&config).await?;

        let started = Instant::now();
        let reply = transport
            .send(TransportRequest::post(url.as_str(), body).header(HEADER_CONTENT_TYPE, CONTENT_TYPE_XML))
            .await?;
        let elapsed = started.elapsed().as_millis();

        if !reply.is_success() {
            log::error!(
                "WeChat Pay returned HTTP {} for {:?} order {:?} after {} ms",
                reply.status,
                request_type,
                request.order_no(),
                elapsed
            );
            return Err(ChannelError::Transport(format!(
                "Unexpected HTTP status {} from {}",
                reply.status, url
            )));
        }

        let content = encoding::decode(&reply.body, &config.encoding)?;
        log::debug!("Response string: {}", content);

        self.cryptor.verify(&content, &config)?;
        let mut response = self.converter.read_from(&content, request)?;
        response.content = Some(content);

        log::info!(
            "WeChat Pay {:?} order {:?} via {} -> code {:?}, status {:?} ({} ms)",
            request_type,
            request.order_no(),
            config.credential_identity(),
            response.code,
            response.transaction().and_then(|t| t.status),
            elapsed
        );
        Ok(response)
    }

    fn handle(&self, notification: &str, request: &Request) -> Result<Response> {
        let config = request.config()?;
        self.cryptor.verify(notification, config)?;

        let mut response = self
            .converter
            .to_transaction_notification_response(notification, request)?;
        response.content = Some(notification.to_string());

        log::info!(
            "WeChat Pay notification for order {:?} -> status {:?}",
            response.order_no(),
            response.transaction().and_then(|t| t.status)
        );
        Ok(response)
    }

    fn receive(&self, notification: &str, config: Arc<ChannelConfig>) -> Result<Request> {
        let placeholder = Request::transaction_notification(Arc::clone(&config), Default::default());
        let response = self.handle(notification, &placeholder)?;

        let mut transaction = response.transaction().cloned().unwrap_or_default();
        transaction.channel_type = Some(ChannelType::Wechat);
        transaction.channel_no = Some(config.channel_no.clone());

        let mut request = Request::transaction_notification(config, transaction);
        request.content = Some(notification.to_string());
        Ok(request)
    }

    fn acknowledge(&self, request: &Request) -> Result<String> {
        self.converter.from_transaction_notification(request)
    }
}
