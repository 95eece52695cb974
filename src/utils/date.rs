// 日期时间工具
// 通道报文中常用的日期时间格式

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write;

use crate::error::{ChannelError, Result};

/// yyyyMMddHHmmss
pub const DATE_TIME: &str = "%Y%m%d%H%M%S";

const DATE_TIME_LENGTH: usize = 14;

/// 解析 yyyyMMddHHmmss 格式的时间 (超长部分忽略)
pub fn parse_date_time(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    let value = value.get(..DATE_TIME_LENGTH).unwrap_or(value);
    NaiveDateTime::parse_from_str(value, DATE_TIME)
        .map_err(|e| ChannelError::Payload(format!("Invalid date time '{}': {}", value, e)))
}

/// 解析 yyyyMMddHHmmss 格式的时间并取日期部分
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    parse_date_time(value).map(|dt| dt.date())
}

/// 按格式输出时间, 格式串非法时返回报文错误
pub fn format(value: &NaiveDateTime, pattern: &str) -> Result<String> {
    let mut formatted = String::new();
    write!(formatted, "{}", value.format(pattern))
        .map_err(|_| ChannelError::Payload(format!("Invalid date format pattern: {}", pattern)))?;
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let value = parse_date_time("20190430153204").unwrap();
        assert_eq!(format(&value, DATE_TIME).unwrap(), "20190430153204");
        assert_eq!(format(&value, "%Y-%m-%d %H:%M:%S").unwrap(), "2019-04-30 15:32:04");
        assert_eq!(parse_date("20190430153204").unwrap(), NaiveDate::from_ymd_opt(2019, 4, 30).unwrap());
    }

    #[test]
    fn test_parse_long_value() {
        assert!(parse_date_time("20190430153204123").is_ok());
    }

    #[test]
    fn test_invalid_value() {
        assert!(matches!(parse_date_time("2019-04-30"), Err(ChannelError::Payload(_))));
    }
}
