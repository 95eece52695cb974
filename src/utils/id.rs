// 标识生成工具
// UUID 与随机字符串, 供报文模板生成流水号和随机串

use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

/// 生成UUID字符串
pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

/// 生成不带连字符的UUID字符串
pub fn uuid_without_dash() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 生成随机字母数字串
///
/// # Arguments
/// * `length` - 长度
///
/// # Returns
/// * 随机字符串
pub fn nonce(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
