//! Site settings module / 站点设置模块
//!
//! Settings are loaded from a JSON file (or built in code) and passed
//! explicitly to the stores / 设置从 JSON 文件加载并显式传入存储

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{OssError, Result};

/// Site settings consumed by the file stores / 文件存储使用的站点设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Enable OSS uploads / 启用 OSS 上传
    pub enable_oss_uploads: bool,
    /// Alternative S3 backend flag, takes precedence when set / S3 上传开关
    pub enable_s3_uploads: bool,
    /// Region, e.g. oss-cn-hangzhou / 区域
    pub oss_region: String,
    pub oss_access_key_id: String,
    pub oss_access_key_secret: String,
    /// Bucket name, optionally "bucket/folder" / 存储桶（可带目录）
    pub oss_upload_bucket: String,
    /// CDN base URL (optional) / CDN 地址
    pub oss_cdn_url: String,
    /// Endpoint override; empty means derived from region / 自定义端点
    pub oss_endpoint: String,
    /// Path-style addressing (emulators) / 路径风格访问
    pub oss_force_path_style: bool,
    /// Request timeout in seconds, 0 keeps the transport default / 请求超时
    pub oss_timeout_secs: u64,
    /// Current site database name / 当前站点数据库名
    pub site_db: String,
    /// Public directory of the local store / 本地公共目录
    pub public_dir: String,
    /// Local download cache directory / 本地缓存目录
    pub cache_dir: String,
    /// Maximum number of cached files / 最大缓存文件数
    pub cache_max_files: usize,
    /// Days a tombstoned object is kept / 墓碑保留天数
    pub tombstone_grace_period_days: u32,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            enable_oss_uploads: false,
            enable_s3_uploads: false,
            oss_region: String::new(),
            oss_access_key_id: String::new(),
            oss_access_key_secret: String::new(),
            oss_upload_bucket: String::new(),
            oss_cdn_url: String::new(),
            oss_endpoint: String::new(),
            oss_force_path_style: false,
            oss_timeout_secs: 0,
            site_db: "default".to_string(),
            public_dir: "public".to_string(),
            cache_dir: "tmp/download_cache".to_string(),
            cache_max_files: 500,
            tombstone_grace_period_days: 30,
        }
    }
}

impl SiteSettings {
    /// Whether the OSS backend should replace the default store / 是否启用 OSS 存储
    pub fn oss_enabled(&self) -> bool {
        self.enable_oss_uploads && !self.enable_s3_uploads
    }

    /// Lower-cased bucket setting / 小写的存储桶设置
    pub fn oss_bucket(&self) -> Result<String> {
        if self.oss_upload_bucket.trim().is_empty() {
            return Err(OssError::SiteSettingMissing("oss_upload_bucket".to_string()));
        }
        Ok(self.oss_upload_bucket.to_lowercase())
    }

    /// Configured CDN URL, if any / CDN 地址
    pub fn cdn_url(&self) -> Option<&str> {
        let cdn = self.oss_cdn_url.trim();
        if cdn.is_empty() {
            None
        } else {
            Some(cdn)
        }
    }

    pub fn public_dir(&self) -> PathBuf {
        PathBuf::from(&self.public_dir)
    }

    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.cache_dir)
    }
}

/// Load settings from a JSON file / 从 JSON 文件加载设置
pub fn load_settings(path: &Path) -> Result<SiteSettings> {
    let content = std::fs::read_to_string(path)?;
    let settings: SiteSettings = serde_json::from_str(&content)
        .map_err(|e| OssError::Config(format!("Failed to parse settings file: {}", e)))?;

    tracing::info!("Loaded site settings from {:?}", path);
    Ok(settings)
}

/// Save settings to a JSON file / 保存设置到文件
pub fn save_settings(path: &Path, settings: &SiteSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| OssError::Config(format!("Failed to serialize settings: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
