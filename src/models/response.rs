// 通道响应数据模型
// 与请求一一对应: 交易响应、交易查询响应、交易通知响应

use chrono::{Local, NaiveDateTime};

use crate::models::Transaction;

/// 通道响应
#[derive(Debug, Clone)]
pub struct Response {
    /// 通道返回码
    pub code: Option<String>,
    /// 通道返回信息
    pub message: Option<String>,
    /// 通道原始报文
    pub content: Option<String>,
    /// 创建时间
    pub created_time: NaiveDateTime,
    /// 响应载荷
    pub body: ResponseBody,
}

/// 响应载荷
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Transaction(TransactionResponse),
    TransactionQuery(TransactionQueryResponse),
    TransactionNotification(TransactionNotificationResponse),
}

/// 交易响应
#[derive(Debug, Clone, Default)]
pub struct TransactionResponse {
    pub order_no: Option<String>,
    pub transaction: Transaction,
}

/// 交易查询响应
#[derive(Debug, Clone, Default)]
pub struct TransactionQueryResponse {
    pub order_no: Option<String>,
    pub query_order_no: Option<String>,
    pub transactions: Vec<Transaction>,
}

/// 交易通知响应
#[derive(Debug, Clone, Default)]
pub struct TransactionNotificationResponse {
    pub order_no: Option<String>,
    pub transaction: Transaction,
}

impl Response {
    /// 创建响应
    pub fn new(code: Option<String>, message: Option<String>, body: ResponseBody) -> Self {
        Self {
            code,
            message,
            content: None,
            created_time: Local::now().naive_local(),
            body,
        }
    }

    /// 订单号
    pub fn order_no(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Transaction(body) => body.order_no.as_deref(),
            ResponseBody::TransactionQuery(body) => body.order_no.as_deref(),
            ResponseBody::TransactionNotification(body) => body.order_no.as_deref(),
        }
    }

    /// 单笔交易 (查询响应返回第一笔)
    pub fn transaction(&self) -> Option<&Transaction> {
        match &self.body {
            ResponseBody::Transaction(body) => Some(&body.transaction),
            ResponseBody::TransactionQuery(body) => body.transactions.first(),
            ResponseBody::TransactionNotification(body) => Some(&body.transaction),
        }
    }

    /// 全部交易
    pub fn transactions(&self) -> &[Transaction] {
        match &self.body {
            ResponseBody::Transaction(body) => std::slice::from_ref(&body.transaction),
            ResponseBody::TransactionQuery(body) => &body.transactions,
            ResponseBody::TransactionNotification(body) => std::slice::from_ref(&body.transaction),
        }
    }
}
