//! OSS 配置：存储桶解析、连接选项、区域主机名

use serde::{Deserialize, Serialize};

use crate::config::SiteSettings;
use crate::error::{OssError, Result};

/// 默认墓碑前缀
pub const TOMBSTONE_PREFIX: &str = "tombstone/";

/// 区域主机名特例（参见 https://help.aliyun.com/document_detail/31837.html）
const REGION_HOST_OVERRIDES: &[(&str, &str)] = &[("oss-cn-shenzhen", "oss-cn-shenzhen.aliyuncs.com")];

/// 区域对应的公网主机名
pub fn region_host(region: &str) -> String {
    REGION_HOST_OVERRIDES
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, host)| host.to_string())
        .unwrap_or_else(|| format!("{}.aliyuncs.com", region))
}

/// 区域默认端点
pub fn endpoint_for_region(region: &str) -> String {
    format!("http://{}.aliyuncs.com", region)
}

/// 存储桶引用："bucket" 或 "bucket/folder"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRef {
    pub name: String,
    pub folder_path: Option<String>,
}

impl BucketRef {
    /// 按第一个 / 拆分，统一小写
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OssError::InvalidParameters("oss_bucket".to_string()));
        }
        let raw = raw.to_lowercase();
        let (name, folder_path) = match raw.split_once('/') {
            Some((name, folder)) => {
                let folder = folder.trim_matches('/');
                (name.to_string(), (!folder.is_empty()).then(|| folder.to_string()))
            }
            None => (raw, None),
        };
        if name.is_empty() {
            return Err(OssError::InvalidParameters("oss_bucket".to_string()));
        }
        Ok(Self { name, folder_path })
    }
}

/// 访问凭证与区域
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OssCredentials {
    pub region: String,
    pub access_key_id: String,
    pub access_key_secret: String,
}

impl OssCredentials {
    pub fn from_settings(settings: &SiteSettings) -> Self {
        Self {
            region: settings.oss_region.trim().to_string(),
            access_key_id: settings.oss_access_key_id.trim().to_string(),
            access_key_secret: settings.oss_access_key_secret.trim().to_string(),
        }
    }
}

/// 最终生效的连接选项
#[derive(Debug, Clone)]
pub struct OssOptions {
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub force_path_style: bool,
    pub timeout_secs: Option<u64>,
}

impl OssOptions {
    /// 由区域和凭证推导的默认选项
    pub fn defaults(credentials: &OssCredentials) -> Self {
        Self {
            endpoint: endpoint_for_region(&credentials.region),
            access_key_id: credentials.access_key_id.clone(),
            access_key_secret: credentials.access_key_secret.clone(),
            force_path_style: false,
            timeout_secs: None,
        }
    }

    /// 调用方选项覆盖默认值
    pub fn merge(mut self, overrides: OssOptionOverrides) -> Self {
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(id) = overrides.access_key_id {
            self.access_key_id = id;
        }
        if let Some(secret) = overrides.access_key_secret {
            self.access_key_secret = secret;
        }
        if let Some(path_style) = overrides.force_path_style {
            self.force_path_style = path_style;
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
        self
    }
}

/// 调用方提供的选项（未设置的字段沿用默认值）
#[derive(Debug, Clone, Default)]
pub struct OssOptionOverrides {
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    pub force_path_style: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl OssOptionOverrides {
    pub fn from_settings(settings: &SiteSettings) -> Self {
        let endpoint = settings.oss_endpoint.trim();
        Self {
            endpoint: (!endpoint.is_empty()).then(|| endpoint.trim_end_matches('/').to_string()),
            force_path_style: settings.oss_force_path_style.then_some(true),
            timeout_secs: (settings.oss_timeout_secs > 0).then_some(settings.oss_timeout_secs),
            ..Default::default()
        }
    }
}

/// 上传对象时的元数据
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub acl: Option<String>,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_ref_parse() {
        assert_eq!(
            BucketRef::parse("Media/Forum/Files").unwrap(),
            BucketRef { name: "media".to_string(), folder_path: Some("forum/files".to_string()) }
        );
        assert_eq!(
            BucketRef::parse("media").unwrap(),
            BucketRef { name: "media".to_string(), folder_path: None }
        );
        assert_eq!(BucketRef::parse("media/").unwrap().folder_path, None);
        assert!(matches!(BucketRef::parse("  "), Err(OssError::InvalidParameters(_))));
    }

    #[test]
    fn test_region_host() {
        assert_eq!(region_host("oss-cn-shenzhen"), "oss-cn-shenzhen.aliyuncs.com");
        assert_eq!(region_host("oss-cn-hangzhou"), "oss-cn-hangzhou.aliyuncs.com");
        assert_eq!(endpoint_for_region("oss-cn-beijing"), "http://oss-cn-beijing.aliyuncs.com");
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let credentials = OssCredentials {
            region: "oss-cn-beijing".to_string(),
            access_key_id: "id".to_string(),
            access_key_secret: "secret".to_string(),
        };
        let options = OssOptions::defaults(&credentials).merge(OssOptionOverrides {
            endpoint: Some("http://127.0.0.1:9000".to_string()),
            force_path_style: Some(true),
            ..Default::default()
        });
        assert_eq!(options.endpoint, "http://127.0.0.1:9000");
        assert_eq!(options.access_key_id, "id");
        assert!(options.force_path_style);
        assert_eq!(options.timeout_secs, None);
    }
}
