// 通用枚举定义
// 通道类型、交易类型、交易状态等跨通道共享的枚举

use serde::{Deserialize, Serialize};
use std::fmt;

/// 第三方通道类型
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    /// 微信支付
    Wechat,
    /// 支付宝
    Alipay,
    /// 京东白条
    Jdfinance,
}

impl ChannelType {
    /// 获取通道名称
    pub fn name(&self) -> &'static str {
        match self {
            ChannelType::Wechat => "WECHAT",
            ChannelType::Alipay => "ALIPAY",
            ChannelType::Jdfinance => "JDFINANCE",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 交易类型
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// 未知
    #[default]
    Unknown,
    /// 分期
    Installment,
    /// 代扣
    Withhold,
    /// 代付
    Pay,
    /// 充值
    Recharge,
    /// 提现
    Withdraw,
    /// 转账
    Transfer,
    /// 退款
    Refund,
}

/// 请求意图
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// 主动发起
    #[default]
    Execute,
    /// 异步通知
    Notify,
}

/// 证件类型
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdType {
    /// 身份证
    IdCard,
    /// 护照
    Passport,
    /// 户口簿
    ResidenceBooklet,
    /// 军官证
    ArmyIdCard,
    /// 警官证
    PoliceIdCard,
    /// 士兵证
    SoldierIdCard,
    /// 外国人居留证
    AlienResidencePermit,
    /// 港澳居民来往内地通行证
    MtpHkMacao,
    /// 台湾同胞来往内地通行证
    MtpTaiwan,
}

/// 交易状态
///
/// 生命周期: CREATED → PREPARED → PROCESSING → {SUCCEED | FAILED} → CLOSED
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// 已创建
    Created,
    /// 已下单
    Prepared,
    /// 处理中
    Processing,
    /// 成功
    Succeed,
    /// 失败
    Failed,
    /// 已关闭
    Closed,
}

impl TransactionStatus {
    fn rank(&self) -> u8 {
        match self {
            TransactionStatus::Created => 0,
            TransactionStatus::Prepared => 1,
            TransactionStatus::Processing => 2,
            TransactionStatus::Succeed | TransactionStatus::Failed => 3,
            TransactionStatus::Closed => 4,
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Succeed | TransactionStatus::Failed | TransactionStatus::Closed
        )
    }

    /// 检查状态迁移是否合法
    ///
    /// 状态只能前进; SUCCEED 与 FAILED 之间不能互相迁移
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        if *self == next {
            return true;
        }
        next.rank() > self.rank()
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Created
    }
}

/// 请求类型 (请求的固定判别值)
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    /// 交易
    Transaction,
    /// 交易查询
    TransactionQuery,
    /// 交易通知
    TransactionNotification,
}
