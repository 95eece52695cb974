// 微信支付通道
// 统一下单、订单查询与支付结果通知

mod converter;
mod cryptor;
mod mapper;
mod processor;

pub use converter::WechatConverter;
pub use cryptor::WechatCryptor;
pub use mapper::{resolve_status, ResponseMapper};
pub use processor::WechatProcessor;

pub(crate) const CODE_SUCCESS: &str = "SUCCESS";
pub(crate) const CODE_ORDER_NOT_EXIST: &str = "ORDERNOTEXIST";
/// 交易失败的终态
pub(crate) const FAILED_TRADE_STATES: &[&str] = &["REFUND", "CLOSED", "REVOKED"];

pub(crate) const FIELD_SIGN: &str = "sign";
pub(crate) const FIELD_RETURN_CODE: &str = "return_code";
pub(crate) const FIELD_RESULT_CODE: &str = "result_code";

pub const TEMPLATE_TRANSACTION: &str = "WECHAT_Transaction";
pub const TEMPLATE_TRANSACTION_QUERY: &str = "WECHAT_TransactionQuery";
pub const TEMPLATE_TRANSACTION_NOTIFICATION: &str = "WECHAT_TransactionNotification";

/// 内置报文模板
pub const TEMPLATES: &[(&str, &str)] = &[
    (
        TEMPLATE_TRANSACTION,
        include_str!("../../../templates/wechat/WECHAT_Transaction.xml"),
    ),
    (
        TEMPLATE_TRANSACTION_QUERY,
        include_str!("../../../templates/wechat/WECHAT_TransactionQuery.xml"),
    ),
    (
        TEMPLATE_TRANSACTION_NOTIFICATION,
        include_str!("../../../templates/wechat/WECHAT_TransactionNotification.xml"),
    ),
];
