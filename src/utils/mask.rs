// 敏感信息掩码工具
// 卡号、手机号、证件号、姓名在日志与调试输出中必须脱敏

const CARD_NUM_MASKER: &str = " **** **** ";
const PHONE_MASKER: &str = "****";
const ID_NO_MASKER: &str = "*******";
const MASKER: char = '*';
const FULL_MASK: &str = "******";

const LEN_MOBILE: usize = 11;
const MIN_LEN_ID_NO: usize = 15;
const MIN_LEN_CARD_NO: usize = 8;
const NORMAL_LEN_CARD_NO: usize = 16;
const MIN_LEN_NAME: usize = 2;

fn head(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}

fn tail(value: &str, n: usize) -> String {
    let len = value.chars().count();
    value.chars().skip(len.saturating_sub(n)).collect()
}

/// 手机号掩码: 13761812345 -> 137****2345
pub fn mask_mobile(mobile: &str) -> String {
    if mobile.chars().count() < LEN_MOBILE {
        return FULL_MASK.to_string();
    }
    format!("{}{}{}", head(mobile, 3), PHONE_MASKER, tail(mobile, 4))
}

/// 卡号掩码: 6226123412345678 -> 6226 **** **** 5678
pub fn mask_card_num(card_num: &str) -> String {
    let length = card_num.chars().count();
    if length < MIN_LEN_CARD_NO {
        return FULL_MASK.to_string();
    }

    let masker = if length < NORMAL_LEN_CARD_NO {
        MASKER.to_string().repeat(length - MIN_LEN_CARD_NO)
    } else {
        CARD_NUM_MASKER.to_string()
    };

    format!("{}{}{}", head(card_num, 4), masker, tail(card_num, 4))
}

/// 证件号掩码: 310702198611165130 -> 310*******5130
pub fn mask_id_no(id_no: &str) -> String {
    if id_no.chars().count() < MIN_LEN_ID_NO {
        return FULL_MASK.to_string();
    }
    format!("{}{}{}", head(id_no, 3), ID_NO_MASKER, tail(id_no, 4))
}

/// 姓名掩码: 张飞 -> 张*, 张翼德 -> 张**
pub fn mask_name(name: &str) -> String {
    let length = name.chars().count();
    if length < MIN_LEN_NAME {
        return FULL_MASK.to_string();
    }
    let mut masked = head(name, 1);
    masked.extend(std::iter::repeat(MASKER).take(length - 1));
    masked
}

/// 完全掩码 (CVV2、有效期、短信验证码、密钥)
pub fn mask_all(_value: &str) -> &'static str {
    FULL_MASK
}

/// 可选字段掩码, 供 Debug 实现使用
pub fn masked(value: &Option<String>, mask: fn(&str) -> String) -> Option<String> {
    value.as_deref().map(mask)
}
