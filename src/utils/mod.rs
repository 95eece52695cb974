// 工具函数模块
// 包含摘要与密钥、XML映射、字符集、脱敏、标识生成、日期格式等通用工具

pub mod crypto;
pub mod date;
pub mod encoding;
pub mod id;
pub mod mask;
pub mod xml;

// 重新导出常用类型
pub use crypto::{DigestAlgorithm, KeyHandle};
pub use xml::{FieldMap, FieldValue, OrdinalType};
