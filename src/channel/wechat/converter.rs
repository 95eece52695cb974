// 微信报文转换器

use std::sync::Arc;

use super::mapper::ResponseMapper;
use super::{TEMPLATE_TRANSACTION, TEMPLATE_TRANSACTION_NOTIFICATION, TEMPLATE_TRANSACTION_QUERY};
use crate::channel::{Converter, TemplateRenderer};
use crate::error::{ChannelError, Result};
use crate::models::{
    Request, RequestBody, Response, ResponseBody, Transaction, TransactionNotificationResponse,
    TransactionQueryResponse, TransactionResponse,
};

/// 微信报文转换器
pub struct WechatConverter {
    renderer: Arc<dyn TemplateRenderer>,
}

impl WechatConverter {
    pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { renderer }
    }
}

impl Converter for WechatConverter {
    fn from_transaction(&self, request: &Request) -> Result<String> {
        self.renderer.render(TEMPLATE_TRANSACTION, request)
    }

    fn from_transaction_query(&self, request: &Request) -> Result<String> {
        // 查询接口每次只接受一个商户订单号
        if let RequestBody::TransactionQuery(body) = &request.body {
            if body.batch {
                return Err(ChannelError::Unsupported(
                    "Batch transaction query is not supported by WeChat Pay".to_string(),
                ));
            }
        }
        self.renderer.render(TEMPLATE_TRANSACTION_QUERY, request)
    }

    fn from_transaction_notification(&self, request: &Request) -> Result<String> {
        self.renderer.render(TEMPLATE_TRANSACTION_NOTIFICATION, request)
    }

    fn to_transaction_response(&self, content: &str, request: &Request) -> Result<Response> {
        let mapper = ResponseMapper::parse(content)?;

        let transaction = Transaction {
            status: Some(mapper.status()),
            settlement_date: mapper.settlement_date()?,
            code: mapper.effective_code(),
            message: mapper.error_message.clone(),
            thirdparty_prepay_no: mapper.prepay_id.clone(),
            code_url: mapper.code_url.clone(),
            ..Default::default()
        };

        Ok(Response::new(
            mapper.code.clone(),
            mapper.message.clone(),
            ResponseBody::Transaction(TransactionResponse {
                order_no: request.order_no().map(str::to_string),
                transaction,
            }),
        ))
    }

    fn to_transaction_query_response(&self, content: &str, request: &Request) -> Result<Response> {
        let mapper = ResponseMapper::parse(content)?;

        let transaction = Transaction {
            status: Some(mapper.status()),
            settlement_date: mapper.settlement_date()?,
            code: mapper.effective_code(),
            message: mapper.error_message.clone(),
            channel_serial_no: mapper.order_no.clone(),
            thirdparty_serial_no: mapper.transaction_id.clone(),
            amount: mapper.amount()?,
            description: mapper.trade_state_description.clone(),
            ..Default::default()
        };

        let query_order_no = match &request.body {
            RequestBody::TransactionQuery(body) => body.query_order_no.clone(),
            _ => None,
        };

        Ok(Response::new(
            mapper.code.clone(),
            mapper.message.clone(),
            ResponseBody::TransactionQuery(TransactionQueryResponse {
                order_no: request.order_no().map(str::to_string),
                query_order_no,
                transactions: vec![transaction],
            }),
        ))
    }

    fn to_transaction_notification_response(
        &self,
        content: &str,
        _request: &Request,
    ) -> Result<Response> {
        let mapper = ResponseMapper::parse(content)?;

        let transaction = Transaction {
            status: Some(mapper.notification_status()),
            completed_time: mapper.finished_time()?,
            settlement_date: mapper.settlement_date()?,
            code: mapper.effective_code(),
            message: mapper.error_message.clone(),
            channel_serial_no: mapper.order_no.clone(),
            thirdparty_serial_no: mapper.transaction_id.clone(),
            amount: mapper.amount()?,
            ..Default::default()
        };

        Ok(Response::new(
            mapper.code.clone(),
            mapper.message.clone(),
            ResponseBody::TransactionNotification(TransactionNotificationResponse {
                order_no: mapper.order_no.clone(),
                transaction,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::wechat::fixtures;
    use crate::channel::wechat::WechatCryptor;
    use crate::channel::{Cryptor, TeraRenderer};
    use crate::models::TransactionStatus;
    use crate::utils::xml::{FieldMap, OrdinalType};
    use chrono::{Duration, Local, NaiveDate};
    use rust_decimal::Decimal;

    fn converter() -> WechatConverter {
        WechatConverter::new(Arc::new(TeraRenderer::new().unwrap()))
    }

    fn transaction_request() -> Request {
        Request::transaction(
            fixtures::config(),
            "f3b3c4c0-9c0b-4bd5-a7fc-2f8a8e0d6e15",
            Transaction {
                channel_serial_no: Some("c91592e61b2f4fe98bb9af530b2831e4".to_string()),
                description: Some("test transaction".to_string()),
                amount: Some(Decimal::from(1)),
                expire_time: Some(Local::now().naive_local() + Duration::hours(1)),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_from_transaction() {
        let content = converter().write_to(&transaction_request()).unwrap();
        assert!(content.contains("appid"));
        assert!(content.contains("mch_id"));

        let fields = FieldMap::parse(&content, OrdinalType::Ascii).unwrap();
        assert_eq!(fields.text("appid"), Some("wx99bcf174724d0ae0"));
        assert_eq!(fields.text("mch_id"), Some("1251462001"));
        assert_eq!(fields.text("total_fee"), Some("100"));
        assert_eq!(fields.text("out_trade_no"), Some("c91592e61b2f4fe98bb9af530b2831e4"));
        assert_eq!(fields.text("notify_url"), Some("http://127.0.0.1"));
        assert_eq!(fields.text("nonce_str").map(str::len), Some(32));
        assert_eq!(fields.text("time_expire").map(str::len), Some(14));
        assert!(content.contains("<sign></sign>"));
    }

    #[test]
    fn test_from_transaction_without_optional_fields() {
        let request = Request::transaction(
            fixtures::config(),
            "order-1",
            Transaction {
                channel_serial_no: Some("c91592e61b2f4fe98bb9af530b2831e4".to_string()),
                amount: Some(Decimal::new(1, 2)),
                ..Default::default()
            },
        );
        let content = converter().write_to(&request).unwrap();
        let fields = FieldMap::parse(&content, OrdinalType::Ascii).unwrap();
        assert_eq!(fields.text("total_fee"), Some("1"));
        assert!(fields.text("time_expire").is_none());
        assert!(fields.text("body").is_none());
    }

    #[test]
    fn test_from_transaction_query() {
        let request = Request::transaction_query(
            fixtures::config(),
            "order-2",
            vec![Transaction {
                channel_serial_no: Some("a14f9fc9cfb34451b930b1530eb8ed1c".to_string()),
                ..Default::default()
            }],
        );
        let content = converter().write_to(&request).unwrap();
        let fields = FieldMap::parse(&content, OrdinalType::Ascii).unwrap();
        assert_eq!(fields.text("appid"), Some("wx99bcf174724d0ae0"));
        assert_eq!(fields.text("mch_id"), Some("1251462001"));
        assert_eq!(fields.text("out_trade_no"), Some("a14f9fc9cfb34451b930b1530eb8ed1c"));
    }

    #[test]
    fn test_from_batch_transaction_query() {
        let transactions = ["a14f9fc9cfb34451b930b1530eb8ed1c", "c91592e61b2f4fe98bb9af530b2831e4"]
            .iter()
            .map(|no| Transaction {
                channel_serial_no: Some(no.to_string()),
                ..Default::default()
            })
            .collect();
        let request = Request::transaction_query(fixtures::config(), "order-2", transactions);
        assert!(matches!(
            converter().write_to(&request),
            Err(ChannelError::Unsupported(_))
        ));
    }

    #[test]
    fn test_from_transaction_with_markup_description() {
        let mut request = transaction_request();
        if let RequestBody::Transaction(body) = &mut request.body {
            body.transaction.description = Some("<sign></sign>]]><total_fee>1</total_fee>".to_string());
        }
        let content = converter().write_to(&request).unwrap();
        let signed = WechatCryptor.sign(&content, &fixtures::config()).unwrap();

        let fields = FieldMap::parse(&signed, OrdinalType::Ascii).unwrap();
        assert_eq!(fields.text("body"), Some("<sign></sign>]]><total_fee>1</total_fee>"));
        assert_eq!(fields.text("detail"), fields.text("body"));
        assert_eq!(fields.text("total_fee"), Some("100"));
        assert_eq!(fields.text("sign").map(str::len), Some(32));
    }

    #[test]
    fn test_to_transaction() {
        let response = converter()
            .read_from(fixtures::TRANSACTION_RESPONSE, &transaction_request())
            .unwrap();
        let transaction = response.transaction().unwrap();

        assert_eq!(response.code.as_deref(), Some("SUCCESS"));
        assert_eq!(response.order_no(), Some("f3b3c4c0-9c0b-4bd5-a7fc-2f8a8e0d6e15"));
        assert_eq!(transaction.status, Some(TransactionStatus::Processing));
        assert_eq!(transaction.code.as_deref(), Some("SUCCESS"));
        assert_eq!(
            transaction.thirdparty_prepay_no.as_deref(),
            Some("wx30165715577881d4d4de0c5d2282184633")
        );
        assert_eq!(
            transaction.code_url.as_deref(),
            Some("weixin://wxpay/bizpayurl?pr=dSLgwqI")
        );
        assert!(transaction.settlement_date.is_none());
    }

    #[test]
    fn test_to_transaction_query() {
        let request = Request::transaction_query(fixtures::config(), "order-2", vec![]);
        let response = converter().read_from(fixtures::QUERY_RESPONSE, &request).unwrap();
        let transaction = response.transaction().unwrap();

        assert_eq!(response.order_no(), Some("order-2"));
        assert_eq!(transaction.status, Some(TransactionStatus::Processing));
        assert_eq!(
            transaction.channel_serial_no.as_deref(),
            Some("a14f9fc9cfb34451b930b1530eb8ed1c")
        );
        assert_eq!(transaction.description.as_deref(), Some("订单未支付"));
    }

    #[test]
    fn test_to_transaction_query_succeed() {
        let content = "<xml><return_code>SUCCESS</return_code><result_code>SUCCESS</result_code>\
            <trade_state>SUCCESS</trade_state><transaction_id>4200000300201904305959411728</transaction_id>\
            <time_end>20190430153515</time_end><total_fee>100</total_fee></xml>";
        let request = Request::transaction_query(fixtures::config(), "order-3", vec![]);
        let response = converter().read_from(content, &request).unwrap();
        let transaction = response.transaction().unwrap();

        assert!(transaction.is_succeed());
        assert_eq!(transaction.settlement_date, NaiveDate::from_ymd_opt(2019, 4, 30));
        assert_eq!(transaction.amount, Some(Decimal::from(1)));
        assert_eq!(
            transaction.thirdparty_serial_no.as_deref(),
            Some("4200000300201904305959411728")
        );
    }

    #[test]
    fn test_to_transaction_notification() {
        let request = Request::transaction_notification(fixtures::config(), Transaction::default());
        let response = converter().read_from(fixtures::NOTIFICATION, &request).unwrap();
        let transaction = response.transaction().unwrap();

        assert_eq!(response.order_no(), Some("c91592e61b2f4fe98bb9af530b2831e4"));
        assert!(transaction.is_succeed());
        assert_eq!(transaction.amount, Some(Decimal::from(1)));
        assert!(transaction.completed_time.is_some());
    }

    #[test]
    fn test_malformed_payload() {
        let error = converter()
            .read_from("<xml><return_code>", &transaction_request())
            .unwrap_err();
        assert!(matches!(error, ChannelError::Payload(_)));
    }
}
