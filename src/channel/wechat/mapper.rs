// 微信响应报文映射
// 报文字段名到规范字段的声明式映射, 以及交易状态判定

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::{CODE_ORDER_NOT_EXIST, CODE_SUCCESS, FAILED_TRADE_STATES};
use crate::error::{ChannelError, Result};
use crate::models::TransactionStatus;
use crate::utils::date;
use crate::utils::xml::{FieldMap, FieldValue, OrdinalType};

macro_rules! response_fields {
    ($($wire:literal => $field:ident),* $(,)?) => {
        /// 微信响应报文字段
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct ResponseMapper {
            $(pub $field: Option<String>,)*
        }

        impl ResponseMapper {
            /// 支持的报文字段名
            pub const FIELDS: &'static [&'static str] = &[$($wire),*];

            fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
                match name {
                    $($wire => Some(&mut self.$field),)*
                    _ => None,
                }
            }
        }
    };
}

response_fields! {
    "return_code" => code,
    "return_msg" => message,
    "appid" => app_id,
    "mch_id" => merchant_no,
    "device_info" => device_info,
    "nonce_str" => nonce,
    "sign" => sign,
    "out_trade_no" => order_no,
    "attach" => attach,
    "result_code" => result_code,
    "trade_state" => trade_state,
    "err_code" => error_code,
    "err_code_des" => error_message,
    "trade_type" => trade_type,
    "prepay_id" => prepay_id,
    "code_url" => code_url,
    "time_end" => finished_time,
    "trade_state_desc" => trade_state_description,
    "transaction_id" => transaction_id,
    "total_fee" => total_fee,
}

impl ResponseMapper {
    /// 解析响应报文, 未知字段忽略
    pub fn parse(content: &str) -> Result<Self> {
        let fields = FieldMap::parse(content, OrdinalType::Unordered)?;
        let mut mapper = ResponseMapper::default();
        for (name, value) in fields.iter() {
            if let (Some(slot), FieldValue::Text(text)) = (mapper.slot(name), value) {
                *slot = Some(text.clone());
            }
        }
        Ok(mapper)
    }

    /// 交易结果码: 错误码非空时取错误码, 否则取业务结果码
    pub fn effective_code(&self) -> Option<String> {
        match self.error_code.as_deref() {
            Some(code) if !code.is_empty() => Some(code.to_string()),
            _ => self.result_code.clone(),
        }
    }

    /// 按交易状态判定
    pub fn status(&self) -> TransactionStatus {
        resolve_status(
            self.code.as_deref(),
            self.result_code.as_deref(),
            self.trade_state.as_deref(),
            self.error_code.as_deref(),
        )
    }

    /// 支付结果通知不携带 trade_state, 以业务结果码代替
    pub fn notification_status(&self) -> TransactionStatus {
        let trade_state = self.trade_state.as_deref().or(self.result_code.as_deref());
        resolve_status(
            self.code.as_deref(),
            self.result_code.as_deref(),
            trade_state,
            self.error_code.as_deref(),
        )
    }

    pub fn finished_time(&self) -> Result<Option<NaiveDateTime>> {
        self.finished_time.as_deref().map(date::parse_date_time).transpose()
    }

    /// 清算日期, 报文中没有完成时间时为空
    pub fn settlement_date(&self) -> Result<Option<NaiveDate>> {
        self.finished_time.as_deref().map(date::parse_date).transpose()
    }

    /// 订单金额 (分 -> 元)
    pub fn amount(&self) -> Result<Option<Decimal>> {
        self.total_fee
            .as_deref()
            .map(|fee| {
                fee.trim()
                    .parse::<i64>()
                    .map(|fen| Decimal::new(fen, 2))
                    .map_err(|e| ChannelError::Payload(format!("Invalid total_fee '{}': {}", fee, e)))
            })
            .transpose()
    }
}

/// 交易状态判定
///
/// 通信与业务结果均成功时才可能得到终态; 其余情况一律为处理中,
/// 由调用方后续查询确认, 不会判定为失败。
///
/// # Arguments
/// * `return_code` - 通信结果码
/// * `result_code` - 业务结果码
/// * `trade_state` - 交易状态
/// * `error_code` - 错误码
pub fn resolve_status(
    return_code: Option<&str>,
    result_code: Option<&str>,
    trade_state: Option<&str>,
    error_code: Option<&str>,
) -> TransactionStatus {
    if return_code != Some(CODE_SUCCESS) || result_code != Some(CODE_SUCCESS) {
        return TransactionStatus::Processing;
    }

    if trade_state == Some(CODE_SUCCESS) {
        TransactionStatus::Succeed
    } else if error_code == Some(CODE_ORDER_NOT_EXIST) {
        TransactionStatus::Failed
    } else if trade_state.map_or(false, |state| FAILED_TRADE_STATES.contains(&state)) {
        TransactionStatus::Failed
    } else {
        TransactionStatus::Processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::wechat::fixtures;

    const OK: Option<&str> = Some("SUCCESS");

    #[test]
    fn test_status_table() {
        assert_eq!(resolve_status(OK, OK, OK, None), TransactionStatus::Succeed);
        assert_eq!(
            resolve_status(OK, OK, None, Some("ORDERNOTEXIST")),
            TransactionStatus::Failed
        );
        assert_eq!(resolve_status(OK, OK, Some("CLOSED"), None), TransactionStatus::Failed);
        assert_eq!(resolve_status(OK, OK, Some("REVOKED"), None), TransactionStatus::Failed);
        assert_eq!(resolve_status(OK, OK, Some("REFUND"), None), TransactionStatus::Failed);
        assert_eq!(resolve_status(OK, OK, Some("NOTPAY"), None), TransactionStatus::Processing);
        assert_eq!(resolve_status(OK, OK, Some("USERPAYING"), None), TransactionStatus::Processing);
        assert_eq!(resolve_status(OK, OK, None, None), TransactionStatus::Processing);
    }

    #[test]
    fn test_failure_codes_never_fail_the_transaction() {
        assert_eq!(resolve_status(Some("FAIL"), None, None, None), TransactionStatus::Processing);
        assert_eq!(
            resolve_status(OK, Some("FAIL"), None, Some("ORDERNOTEXIST")),
            TransactionStatus::Processing
        );
        assert_eq!(
            resolve_status(Some("FAIL"), OK, Some("CLOSED"), None),
            TransactionStatus::Processing
        );
    }

    #[test]
    fn test_failed_states_match_exactly() {
        assert_eq!(resolve_status(OK, OK, Some("CLOSE"), None), TransactionStatus::Processing);
        assert_eq!(resolve_status(OK, OK, Some(""), None), TransactionStatus::Processing);
    }

    #[test]
    fn test_parse_transaction_response() {
        let mapper = ResponseMapper::parse(fixtures::TRANSACTION_RESPONSE).unwrap();
        assert_eq!(mapper.code.as_deref(), Some("SUCCESS"));
        assert_eq!(mapper.message.as_deref(), Some("OK"));
        assert_eq!(
            mapper.prepay_id.as_deref(),
            Some("wx30165715577881d4d4de0c5d2282184633")
        );
        assert_eq!(mapper.effective_code().as_deref(), Some("SUCCESS"));
        assert_eq!(mapper.status(), TransactionStatus::Processing);
        assert!(mapper.settlement_date().unwrap().is_none());
    }

    #[test]
    fn test_effective_code_prefers_error_code() {
        let mapper = ResponseMapper::parse(
            "<xml><return_code>SUCCESS</return_code><result_code>FAIL</result_code>\
             <err_code>ORDERPAID</err_code><err_code_des>order paid</err_code_des></xml>",
        )
        .unwrap();
        assert_eq!(mapper.effective_code().as_deref(), Some("ORDERPAID"));
        assert_eq!(mapper.error_message.as_deref(), Some("order paid"));

        let empty = ResponseMapper::parse(
            "<xml><result_code>FAIL</result_code><err_code></err_code></xml>",
        )
        .unwrap();
        assert_eq!(empty.effective_code().as_deref(), Some("FAIL"));
    }

    #[test]
    fn test_notification_fields() {
        let mapper = ResponseMapper::parse(fixtures::NOTIFICATION).unwrap();
        assert_eq!(mapper.notification_status(), TransactionStatus::Succeed);
        assert_eq!(mapper.amount().unwrap(), Some(Decimal::new(100, 2)));
        assert_eq!(
            mapper.settlement_date().unwrap(),
            NaiveDate::from_ymd_opt(2019, 4, 30)
        );
        assert_eq!(mapper.status(), TransactionStatus::Processing);
    }

    #[test]
    fn test_invalid_values() {
        let mapper = ResponseMapper::parse(
            "<xml><time_end>2019-04-30</time_end><total_fee>1.00</total_fee></xml>",
        )
        .unwrap();
        assert!(matches!(mapper.settlement_date(), Err(ChannelError::Payload(_))));
        assert!(matches!(mapper.amount(), Err(ChannelError::Payload(_))));
    }

    #[test]
    fn test_field_table() {
        assert!(ResponseMapper::FIELDS.contains(&"trade_state_desc"));
        assert_eq!(ResponseMapper::FIELDS.len(), 20);
    }
}
