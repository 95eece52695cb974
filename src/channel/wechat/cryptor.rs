// 微信报文签名与验签
// 参与签名的字段按键名ASCII升序拼接, 末尾追加 &key=<密钥> 后做摘要, 结果为大写十六进制

use super::{CODE_SUCCESS, FIELD_RESULT_CODE, FIELD_RETURN_CODE, FIELD_SIGN};
use crate::channel::Cryptor;
use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::utils::crypto::{self, DigestAlgorithm};
use crate::utils::encoding;
use crate::utils::xml::{self, FieldMap, OrdinalType};

/// 微信加解密器
#[derive(Debug, Default, Clone, Copy)]
pub struct WechatCryptor;

impl WechatCryptor {
    pub fn new() -> Self {
        Self
    }

    /// 计算签名 (fields 中不应包含 sign 字段)
    fn signature(&self, fields: &FieldMap, config: &ChannelConfig) -> Result<String> {
        let algorithm = DigestAlgorithm::from_name(&config.signature_algorithm)?;
        let plain = format!("{}&key={}", fields.pair(), config.secret_key);
        let bytes = encoding::encode(&plain, &config.encoding)?;
        crypto::digest_hex_upper(algorithm, &config.secret_key, &bytes)
    }
}

impl Cryptor for WechatCryptor {
    fn sign(&self, content: &str, config: &ChannelConfig) -> Result<String> {
        let mut fields = FieldMap::parse(content, OrdinalType::Ascii)?;
        fields.remove(FIELD_SIGN);

        let signature = self.signature(&fields, config)?;
        xml::replace_node_text(content, FIELD_SIGN, &signature)
    }

    fn verify(&self, content: &str, config: &ChannelConfig) -> Result<()> {
        let mut fields = FieldMap::parse(content, OrdinalType::Ascii)?;

        // 失败报文不携带签名
        if fields.text(FIELD_RETURN_CODE) != Some(CODE_SUCCESS)
            || fields.text(FIELD_RESULT_CODE) != Some(CODE_SUCCESS)
        {
            log::debug!("Skip signature verification for non-success payload");
            return Ok(());
        }

        let signature = fields
            .remove_text(FIELD_SIGN)
            .ok_or_else(|| ChannelError::Integrity("No signature found in response".to_string()))?;
        let expected = self.signature(&fields, config)?;

        if crypto::constant_time_eq_ignore_case(&signature, &expected) {
            Ok(())
        } else {
            log::error!(
                "Invalid signature found in response for {}",
                config.credential_identity()
            );
            Err(ChannelError::Integrity("Invalid signature found in response".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::wechat::fixtures;

    const REQUEST: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><xml><appid>wx99bcf174724d0ae0</appid>\
        <mch_id>1251462001</mch_id><nonce_str>52dfdd18186a42cabb96f98882c4e69d</nonce_str>\
        <out_trade_no>c91592e61b2f4fe98bb9af530b2831e4</out_trade_no>\
        <product_id>c91592e61b2f4fe98bb9af530b2831e4</product_id><sign_type>MD5</sign_type>\
        <body>test transaction</body><detail>test transaction</detail>\
        <notify_url>http://127.0.0.1</notify_url><fee_type>CNY</fee_type><total_fee>100</total_fee>\
        <time_start>20190430153204</time_start><time_expire>20190430163204</time_expire>\
        <trade_type>NATIVE</trade_type><sign></sign></xml>";

    fn config_with(algorithm: &str) -> ChannelConfig {
        ChannelConfig {
            signature_algorithm: algorithm.to_string(),
            ..(*fixtures::config()).clone()
        }
    }

    #[test]
    fn test_sign_md5() {
        let signed = WechatCryptor.sign(REQUEST, &fixtures::config()).unwrap();
        assert_eq!(
            signed,
            REQUEST.replace("<sign></sign>", "<sign>DE459DEE8363C2D4A74AF4B99215DC32</sign>")
        );
    }

    #[test]
    fn test_sign_sha256_and_hmac() {
        let signed = WechatCryptor.sign(REQUEST, &config_with("SHA-256")).unwrap();
        assert!(signed.contains(
            "<sign>1BBBA4CBAD3BA931A395ABE0B9FADF2B4E9A77880F021992A6E35275340E0185</sign>"
        ));

        let signed = WechatCryptor.sign(REQUEST, &config_with("HMAC-SHA256")).unwrap();
        assert!(signed.contains(
            "<sign>A8DAE3143DE8CC63C52A3D7B09B63F6421239515CA7ADA602BE430DA93780486</sign>"
        ));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let config = fixtures::config();
        let first = WechatCryptor.sign(REQUEST, &config).unwrap();
        let second = WechatCryptor.sign(REQUEST, &config).unwrap();
        assert_eq!(first, second);

        // 已有签名不参与计算
        assert_eq!(WechatCryptor.sign(&first, &config).unwrap(), first);
    }

    #[test]
    fn test_sign_ignores_sign_tag_in_text() {
        let config = fixtures::config();
        let request = REQUEST.replace(
            "<body>test transaction</body>",
            "<body><![CDATA[<sign></sign>]]></body>",
        );
        let signed = WechatCryptor.sign(&request, &config).unwrap();

        let fields = FieldMap::parse(&signed, OrdinalType::Ascii).unwrap();
        assert_eq!(fields.text("body"), Some("<sign></sign>"));
        let signature = fields.text(FIELD_SIGN).unwrap();
        assert_eq!(signature.len(), 32);
        assert!(signed.ends_with(&format!("<sign>{}</sign></xml>", signature)));
    }

    #[test]
    fn test_sign_errors() {
        assert!(matches!(
            WechatCryptor.sign(REQUEST, &config_with("SM3")),
            Err(ChannelError::Configuration(_))
        ));

        let config = ChannelConfig {
            encoding: "X-UNKNOWN".to_string(),
            ..(*fixtures::config()).clone()
        };
        assert!(matches!(
            WechatCryptor.sign(REQUEST, &config),
            Err(ChannelError::Encoding(_))
        ));

        let unsigned = REQUEST.replace("<sign></sign>", "");
        assert!(matches!(
            WechatCryptor.sign(&unsigned, &fixtures::config()),
            Err(ChannelError::Payload(_))
        ));
    }

    #[test]
    fn test_verify_success_payloads() {
        let config = fixtures::config();
        assert!(WechatCryptor.verify(fixtures::TRANSACTION_RESPONSE, &config).is_ok());
        assert!(WechatCryptor.verify(fixtures::QUERY_RESPONSE, &config).is_ok());
        assert!(WechatCryptor.verify(fixtures::NOTIFICATION, &config).is_ok());
    }

    #[test]
    fn test_verify_signed_payload() {
        let config = config_with("HMAC-SHA256");
        let unsigned = fixtures::TRANSACTION_RESPONSE.replace(
            "<![CDATA[982B4ED31C0E71BA801101EB18A023E4]]>",
            "",
        );
        let signed = WechatCryptor.sign(&unsigned, &config).unwrap();
        assert!(WechatCryptor.verify(&signed, &config).is_ok());
        let tampered = signed.replace("wx30165715577881d4d4de0c5d2282184633", "wx30000000000000000000000000000000000");
        assert!(matches!(
            WechatCryptor.verify(&tampered, &config),
            Err(ChannelError::Integrity(_))
        ));
    }

    #[test]
    fn test_verify_case_insensitive() {
        let lower = fixtures::TRANSACTION_RESPONSE.replace(
            "982B4ED31C0E71BA801101EB18A023E4",
            "982b4ed31c0e71ba801101eb18a023e4",
        );
        assert!(WechatCryptor.verify(&lower, &fixtures::config()).is_ok());
    }

    #[test]
    fn test_verify_tampered_success_payload() {
        let tampered = fixtures::TRANSACTION_RESPONSE.replace("dSLgwqI", "attacker");
        assert!(matches!(
            WechatCryptor.verify(&tampered, &fixtures::config()),
            Err(ChannelError::Integrity(_))
        ));

        let unsigned = fixtures::TRANSACTION_RESPONSE.replace(
            "<sign><![CDATA[982B4ED31C0E71BA801101EB18A023E4]]></sign>",
            "",
        );
        assert!(matches!(
            WechatCryptor.verify(&unsigned, &fixtures::config()),
            Err(ChannelError::Integrity(_))
        ));
    }

    #[test]
    fn test_verify_skips_failure_payload() {
        let failure = "<xml><return_code><![CDATA[FAIL]]></return_code>\
            <return_msg><![CDATA[appid and mch_id do not match]]></return_msg>\
            <sign><![CDATA[TAMPERED]]></sign></xml>";
        assert!(WechatCryptor.verify(failure, &fixtures::config()).is_ok());

        let business_failure = fixtures::TRANSACTION_RESPONSE
            .replace(
                "<result_code><![CDATA[SUCCESS]]></result_code>",
                "<result_code><![CDATA[FAIL]]></result_code>",
            )
            .replace("dSLgwqI", "tampered");
        assert!(WechatCryptor.verify(&business_failure, &fixtures::config()).is_ok());
    }
}
