// 报文模板渲染
// 基于 tera 的模板渲染器, 模板中可使用标识生成、日期格式化与金额转换辅助函数

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tera::{Context, Tera, Value};

use crate::channel::wechat;
use crate::error::Result;
use crate::models::Request;
use crate::utils::{date, id};

/// 模板上下文中请求对象的名称
pub const TEMPLATE_ATTRIBUTE_REQUEST: &str = "request";

const DEFAULT_NONCE_LENGTH: u64 = 32;

/// 模板渲染器
pub trait TemplateRenderer: Send + Sync {
    /// 使用请求渲染指定模板
    fn render(&self, name: &str, request: &Request) -> Result<String>;
}

/// tera 模板渲染器
///
/// 模板在创建时一次性加载, 之后只读, 可在线程间共享。
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// 创建加载了全部内置通道模板的渲染器
    pub fn new() -> Result<Self> {
        Self::with_templates(wechat::TEMPLATES.iter().copied())
    }

    /// 使用给定的 (模板名, 模板内容) 创建渲染器
    pub fn with_templates<I, N, C>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut tera = Tera::default();
        // 报文字段由模板自行包裹在 CDATA 中, 插值经 cdata 过滤器处理
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates)?;

        tera.register_function("uuid", uuid_function);
        tera.register_function("nonce", nonce_function);
        tera.register_function("format_date", format_date_function);
        tera.register_filter("fen", fen_filter);
        tera.register_filter("cdata", cdata_filter);

        Ok(Self { tera })
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render(&self, name: &str, request: &Request) -> Result<String> {
        let mut context = Context::new();
        context.insert(TEMPLATE_ATTRIBUTE_REQUEST, request);

        self.tera.render(name, &context).map_err(|e| {
            log::error!("Failed to render the template - {}: {}", name, e);
            e.into()
        })
    }
}

/// `uuid()`: 不带连字符的UUID
fn uuid_function(_args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(id::uuid_without_dash()))
}

/// `nonce(length=32)`: 随机字母数字串
fn nonce_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let length = match args.get("length") {
        Some(value) => value
            .as_u64()
            .ok_or_else(|| tera::Error::msg("Function `nonce` expects an integer `length`"))?,
        None => DEFAULT_NONCE_LENGTH,
    };
    Ok(Value::String(id::nonce(length as usize)))
}

/// `format_date(value=..., format="%Y%m%d%H%M%S")`
fn format_date_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let value = args
        .get("value")
        .ok_or_else(|| tera::Error::msg("Function `format_date` requires a `value` argument"))?;
    let pattern = args.get("format").and_then(Value::as_str).unwrap_or(date::DATE_TIME);

    let date_time: NaiveDateTime = serde_json::from_value(value.clone())
        .map_err(|e| tera::Error::msg(format!("Function `format_date` got an invalid date time: {}", e)))?;
    date::format(&date_time, pattern)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(e.to_string()))
}

/// `amount | fen`: 元转换为分
fn fen_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => {
            return Err(tera::Error::msg(format!(
                "Filter `fen` expects a decimal amount, got {}",
                other
            )))
        }
    };

    let amount = Decimal::from_str(&text)
        .map_err(|e| tera::Error::msg(format!("Filter `fen` got an invalid amount '{}': {}", text, e)))?;
    (amount * Decimal::from(100))
        .round()
        .to_i64()
        .map(Value::from)
        .ok_or_else(|| tera::Error::msg(format!("Amount out of range: {}", amount)))
}

/// `value | cdata`: 拆分 CDATA 结束符, 使取值只能作为节点文本
fn cdata_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Ok(Value::String(text.replace("]]>", "]]]]><![CDATA[>")))
}
