//! OSS 存储工厂

use anyhow::Result;

use super::store::OssStore;
use crate::config::SiteSettings;
use crate::storage::{ConfigItem, FileStore, StoreFactory};

/// OSS 存储工厂
pub struct OssStoreFactory;

impl StoreFactory for OssStoreFactory {
    fn store_type(&self) -> &'static str {
        "oss"
    }

    fn config_items(&self) -> Vec<ConfigItem> {
        vec![
            ConfigItem::new("enable_oss_uploads", "bool")
                .title("启用 OSS 上传")
                .help("与 enable_s3_uploads 互斥")
                .default("false"),
            ConfigItem::new("oss_region", "string")
                .title("区域")
                .help("如 oss-cn-hangzhou")
                .required(),
            ConfigItem::new("oss_access_key_id", "string")
                .title("Access Key ID")
                .required(),
            ConfigItem::new("oss_access_key_secret", "password")
                .title("Access Key Secret")
                .required(),
            ConfigItem::new("oss_upload_bucket", "string")
                .title("存储桶")
                .help("存储桶名称，可带目录：bucket/folder")
                .required(),
            ConfigItem::new("oss_cdn_url", "string")
                .title("CDN 地址")
                .help("CDN加速域名（可选）"),
            ConfigItem::new("oss_endpoint", "string")
                .title("端点地址")
                .help("留空则使用 http://{region}.aliyuncs.com"),
            ConfigItem::new("oss_force_path_style", "bool")
                .title("强制路径风格")
                .default("false"),
        ]
    }

    fn create_store(&self, settings: &SiteSettings) -> Result<Box<dyn FileStore>> {
        Ok(Box::new(OssStore::new(settings)?))
    }
}
