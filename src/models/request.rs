// 通道请求数据模型
// 交易、交易查询、交易通知三类请求共用的外壳与各自的载荷

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::sync::Arc;

use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::models::{Operation, RequestType, Transaction, TransactionType};

/// 通道请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// 创建时间
    pub created_time: NaiveDateTime,
    /// 交易类型
    pub transaction_type: TransactionType,
    /// 请求意图
    pub operation: Operation,
    /// 签名后的原始报文 (审计用)
    pub content: Option<String>,
    /// 通道配置
    pub config: Option<Arc<ChannelConfig>>,
    /// 请求载荷
    #[serde(flatten)]
    pub body: RequestBody,
}

/// 请求载荷
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Transaction(TransactionRequest),
    TransactionQuery(TransactionQueryRequest),
    TransactionNotification(TransactionNotificationRequest),
}

/// 交易请求
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// 订单号
    pub order_no: String,
    /// 交易
    pub transaction: Transaction,
}

/// 交易查询请求
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQueryRequest {
    /// 订单号
    pub order_no: String,
    /// 查询单号
    pub query_order_no: Option<String>,
    /// 是否批量查询
    pub batch: bool,
    /// 待查询的交易
    pub transactions: Vec<Transaction>,
}

/// 交易通知请求
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNotificationRequest {
    /// 通知携带的交易
    pub transaction: Transaction,
}

impl Request {
    fn new(body: RequestBody, config: Arc<ChannelConfig>) -> Self {
        Self {
            created_time: Local::now().naive_local(),
            transaction_type: TransactionType::default(),
            operation: Operation::default(),
            content: None,
            config: Some(config),
            body,
        }
    }

    /// 创建交易请求
    pub fn transaction(config: Arc<ChannelConfig>, order_no: impl Into<String>, transaction: Transaction) -> Self {
        Self::new(
            RequestBody::Transaction(TransactionRequest {
                order_no: order_no.into(),
                transaction,
            }),
            config,
        )
    }

    /// 创建交易查询请求
    pub fn transaction_query(
        config: Arc<ChannelConfig>,
        order_no: impl Into<String>,
        transactions: Vec<Transaction>,
    ) -> Self {
        let batch = transactions.len() > 1;
        Self::new(
            RequestBody::TransactionQuery(TransactionQueryRequest {
                order_no: order_no.into(),
                query_order_no: None,
                batch,
                transactions,
            }),
            config,
        )
    }

    /// 创建交易通知请求
    pub fn transaction_notification(config: Arc<ChannelConfig>, transaction: Transaction) -> Self {
        let mut request = Self::new(
            RequestBody::TransactionNotification(TransactionNotificationRequest { transaction }),
            config,
        );
        request.operation = Operation::Notify;
        request
    }

    /// 请求类型
    pub fn request_type(&self) -> RequestType {
        match self.body {
            RequestBody::Transaction(_) => RequestType::Transaction,
            RequestBody::TransactionQuery(_) => RequestType::TransactionQuery,
            RequestBody::TransactionNotification(_) => RequestType::TransactionNotification,
        }
    }

    /// 获取通道配置, 未设置时返回配置错误
    pub fn config(&self) -> Result<&Arc<ChannelConfig>> {
        self.config.as_ref().ok_or_else(|| {
            ChannelError::Configuration(format!(
                "No channel config attached to {:?} request",
                self.request_type()
            ))
        })
    }

    /// 订单号 (通知请求没有订单号)
    pub fn order_no(&self) -> Option<&str> {
        match &self.body {
            RequestBody::Transaction(body) => Some(body.order_no.as_str()),
            RequestBody::TransactionQuery(body) => Some(body.order_no.as_str()),
            RequestBody::TransactionNotification(_) => None,
        }
    }
}
