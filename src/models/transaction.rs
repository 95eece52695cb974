// 通道交易数据模型
// 单笔支付尝试的标识、支付工具信息、金额与结果

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ChannelType, IdType, TransactionStatus};
use crate::utils::mask;

/// 通道交易
///
/// 支付工具字段 (卡号、手机号、证件号、CVV2 等) 属于敏感信息,
/// `Debug` 输出中一律脱敏。
#[derive(Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// 平台流水号
    pub serial_no: Option<String>,

    /// 通道编号
    pub channel_no: Option<String>,
    /// 通道类型
    pub channel_type: Option<ChannelType>,
    /// 发往通道的流水号
    pub channel_serial_no: Option<String>,
    /// 第三方流水号
    pub thirdparty_serial_no: Option<String>,
    /// 第三方预支付单号
    pub thirdparty_prepay_no: Option<String>,

    /// 银行简称
    pub bank_acronym: Option<String>,
    /// 银行编码
    pub bank_code: Option<String>,
    /// 银行账号
    pub bank_account_no: Option<String>,
    /// 开户名
    pub bank_account_name: Option<String>,
    /// 银行预留手机号
    pub bank_reserved_phone: Option<String>,
    /// 信用卡 CVV2
    pub cvv2: Option<String>,
    /// 信用卡有效期
    pub valid_thru: Option<String>,
    /// 短信验证码
    pub sms_pin_code: Option<String>,
    /// 证件号
    pub id_no: Option<String>,
    /// 证件类型
    pub id_type: Option<IdType>,
    /// 支行名称
    pub branch_name: Option<String>,
    /// 支行所在省份
    pub branch_province: Option<String>,
    /// 支行所在城市编码
    pub branch_city_code: Option<String>,

    /// 交易金额 (元)
    pub amount: Option<Decimal>,

    /// 过期时间
    pub expire_time: Option<NaiveDateTime>,
    /// 完成时间
    pub completed_time: Option<NaiveDateTime>,
    /// 清算日期
    pub settlement_date: Option<NaiveDate>,
    /// 交易状态
    pub status: Option<TransactionStatus>,

    /// 交易描述
    pub description: Option<String>,
    /// 通道返回的二维码链接
    pub code_url: Option<String>,

    /// 结果码
    pub code: Option<String>,
    /// 结果信息
    pub message: Option<String>,
}

impl Transaction {
    /// 交易是否已成功
    pub fn is_succeed(&self) -> bool {
        self.status == Some(TransactionStatus::Succeed)
    }

    /// 交易是否已失败
    pub fn is_failed(&self) -> bool {
        self.status == Some(TransactionStatus::Failed)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = |value: &Option<String>| value.as_deref().map(mask::mask_all);

        f.debug_struct("Transaction")
            .field("serial_no", &self.serial_no)
            .field("channel_no", &self.channel_no)
            .field("channel_type", &self.channel_type)
            .field("channel_serial_no", &self.channel_serial_no)
            .field("thirdparty_serial_no", &self.thirdparty_serial_no)
            .field("thirdparty_prepay_no", &self.thirdparty_prepay_no)
            .field("bank_acronym", &self.bank_acronym)
            .field("bank_code", &self.bank_code)
            .field("bank_account_no", &mask::masked(&self.bank_account_no, mask::mask_card_num))
            .field("bank_account_name", &mask::masked(&self.bank_account_name, mask::mask_name))
            .field("bank_reserved_phone", &mask::masked(&self.bank_reserved_phone, mask::mask_mobile))
            .field("cvv2", &full(&self.cvv2))
            .field("valid_thru", &full(&self.valid_thru))
            .field("sms_pin_code", &full(&self.sms_pin_code))
            .field("id_no", &mask::masked(&self.id_no, mask::mask_id_no))
            .field("id_type", &self.id_type)
            .field("branch_name", &self.branch_name)
            .field("branch_province", &self.branch_province)
            .field("branch_city_code", &self.branch_city_code)
            .field("amount", &self.amount)
            .field("expire_time", &self.expire_time)
            .field("completed_time", &self.completed_time)
            .field("settlement_date", &self.settlement_date)
            .field("status", &self.status)
            .field("description", &self.description)
            .field("code_url", &self.code_url)
            .field("code", &self.code)
            .field("message", &self.message)
            .finish()
    }
}
