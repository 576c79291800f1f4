//! OSS V1 请求签名
//!
//! Authorization: OSS {AccessKeyId}:{base64(hmac_sha1(secret, StringToSign))}
//! StringToSign = VERB \n Content-MD5 \n Content-Type \n Date \n
//!                CanonicalizedOSSHeaders CanonicalizedResource

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 1123 GMT 日期
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Content-MD5 头：base64(md5(body))
pub fn content_md5(body: &[u8]) -> String {
    BASE64.encode(md5::compute(body).0)
}

/// 规范化 x-oss-* 头：小写、排序、每行 "name:value\n"
pub fn canonicalized_oss_headers(headers: &[(String, String)]) -> String {
    let mut oss: Vec<(String, &str)> = headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.trim()))
        .filter(|(k, _)| k.starts_with("x-oss-"))
        .collect();
    oss.sort();
    oss.iter().map(|(k, v)| format!("{}:{}\n", k, v)).collect()
}

/// "/{bucket}/{key}"，带可选子资源（如 lifecycle）
pub fn canonicalized_resource(bucket: &str, key: &str, sub_resource: Option<&str>) -> String {
    match sub_resource {
        Some(sub) => format!("/{}/{}?{}", bucket, key, sub),
        None => format!("/{}/{}", bucket, key),
    }
}

pub fn string_to_sign(
    verb: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
    oss_headers: &[(String, String)],
    resource: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}{}",
        verb,
        content_md5,
        content_type,
        date,
        canonicalized_oss_headers(oss_headers),
        resource
    )
}

pub fn signature(access_key_secret: &str, string_to_sign: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(access_key_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

pub fn authorization(access_key_id: &str, access_key_secret: &str, string_to_sign: &str) -> String {
    format!("OSS {}:{}", access_key_id, signature(access_key_secret, string_to_sign))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_http_date() {
        let date = Utc.with_ymd_and_hms(2005, 11, 17, 18, 49, 58).unwrap();
        assert_eq!(http_date(date), "Thu, 17 Nov 2005 18:49:58 GMT");
    }

    #[test]
    fn test_content_md5() {
        assert_eq!(content_md5(b"hello oss"), "M3szwC+JSTAmhDmD/ycqMA==");
    }

    #[test]
    fn test_string_to_sign_layout() {
        let headers = vec![
            ("X-OSS-Meta-Author".to_string(), "foo@example.com".to_string()),
            ("Content-Disposition".to_string(), "attachment".to_string()),
            ("x-oss-magic".to_string(), "abracadabra".to_string()),
        ];
        let s = string_to_sign(
            "PUT",
            "eB5eJF1ptWaXm4bijSPyxw==",
            "text/html",
            "Thu, 17 Nov 2005 18:49:58 GMT",
            &headers,
            &canonicalized_resource("oss-example", "nelson", None),
        );
        assert_eq!(
            s,
            "PUT\neB5eJF1ptWaXm4bijSPyxw==\ntext/html\nThu, 17 Nov 2005 18:49:58 GMT\n\
             x-oss-magic:abracadabra\nx-oss-meta-author:foo@example.com\n/oss-example/nelson"
        );
    }

    #[test]
    fn test_authorization() {
        let s = "PUT\neB5eJF1ptWaXm4bijSPyxw==\ntext/html\nThu, 17 Nov 2005 18:49:58 GMT\n\
                 x-oss-magic:abracadabra\nx-oss-meta-author:foo@example.com\n/oss-example/nelson";
        assert_eq!(
            authorization("44CF9590006BF252F707", "OtxrzxIsfpFjA7SwPzILwy8Bw21TLhquhboDYROV", s),
            "OSS 44CF9590006BF252F707:8HQ6ejfvfwbs/JyzhzA/ElF4fx8="
        );
    }

    #[test]
    fn test_sub_resource() {
        assert_eq!(canonicalized_resource("b", "", Some("lifecycle")), "/b/?lifecycle");
    }
}
