//! OSS 文件存储：实现宿主的 FileStore 接口
//!
//! 上传、删除委托给 ObjectClient，本层负责路径约定与 URL 生成/改写。

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use std::path::PathBuf;

use super::client::{ObjectClient, OssClient};
use super::config::{region_host, PutOptions, TOMBSTONE_PREFIX};
use crate::config::SiteSettings;
use crate::drivers::local::{LocalCache, LocalStore};
use crate::storage::{
    external_avatar_url, get_path_for_optimized_image, get_path_for_upload, FileStore, OptimizedImage,
    StoreOptions, Upload, UserAvatar,
};
use crate::utils::{is_image, url_hostname};

/// 上传文件默认公开可读
const DEFAULT_ACL: &str = "public-read";

pub struct OssStore {
    client: Box<dyn ObjectClient>,
    region: String,
    cdn_url: Option<String>,
    site_db: String,
    local: LocalStore,
    cache: LocalCache,
    base_url: OnceCell<String>,
}

impl OssStore {
    /// 按站点设置创建（存储桶设置为空时报 SiteSettingMissing）
    pub fn new(settings: &SiteSettings) -> crate::Result<Self> {
        let bucket = settings.oss_bucket()?;
        let client = OssClient::from_settings(settings, &bucket, TOMBSTONE_PREFIX)?;
        Ok(Self::with_client(settings, Box::new(client)))
    }

    /// 使用指定的对象存储客户端
    pub fn with_client(settings: &SiteSettings, client: Box<dyn ObjectClient>) -> Self {
        Self {
            client,
            region: settings.oss_region.trim().to_string(),
            cdn_url: settings.cdn_url().map(|cdn| cdn.trim_end_matches('/').to_string()),
            site_db: settings.site_db.clone(),
            local: LocalStore::new(settings.public_dir()),
            cache: LocalCache::new(settings.cache_dir(), settings.cache_max_files),
            base_url: OnceCell::new(),
        }
    }

    /// 头像目标地址
    pub fn avatar_template(&self, avatar: &UserAvatar, user_id: i64) -> String {
        external_avatar_url(self.absolute_base_url(), user_id, avatar.upload_id, avatar.width)
    }

    /// 设置墓碑目录过期天数
    pub async fn update_tombstone_lifecycle(&self, grace_period_days: u32) -> Result<()> {
        self.client.update_tombstone_lifecycle(grace_period_days).await?;
        Ok(())
    }

    /// 去掉 "{absolute_base_url}/" 前缀，得到对象键
    fn strip_base_url(&self, url: &str) -> String {
        url.replacen(&format!("{}/", self.absolute_base_url()), "", 1)
    }
}

/// "attachment; filename=..."，非 ASCII 文件名追加 RFC 5987 编码形式
fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        format!("attachment; filename=\"{}\"", filename.replace('"', "\\\""))
    } else {
        let encoded = urlencoding::encode(filename);
        format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", encoded, encoded)
    }
}

/// URL 开头的协议部分（"https:"、"http:" 或空）
fn scheme_token(url: &str) -> &str {
    if url.starts_with("https://") {
        "https:"
    } else if url.starts_with("http://") {
        "http:"
    } else {
        ""
    }
}

#[async_trait]
impl FileStore for OssStore {
    fn name(&self) -> &str {
        "oss"
    }

    async fn store_upload(&self, file: Bytes, upload: &Upload, content_type: Option<&str>) -> Result<String> {
        let path = get_path_for_upload(upload);
        let opts = StoreOptions {
            filename: Some(upload.original_filename.clone()),
            content_type: content_type.map(str::to_string),
            cache_locally: true,
        };
        self.store_file(file, &path, opts).await
    }

    async fn store_optimized_image(&self, file: Bytes, optimized_image: &OptimizedImage) -> Result<String> {
        let path = get_path_for_optimized_image(optimized_image);
        self.store_file(file, &path, StoreOptions::default()).await
    }

    async fn store_file(&self, file: Bytes, path: &str, opts: StoreOptions) -> Result<String> {
        let filename = opts.filename.filter(|f| !f.trim().is_empty());
        let content_type = opts.content_type.filter(|t| !t.trim().is_empty());

        // 本地缓存先于远端写入，远端失败时不回滚
        if opts.cache_locally {
            let name = path.rsplit('/').next().unwrap_or(path);
            self.cache.cache_file(&file, name).await?;
        }

        let mut put = PutOptions {
            acl: Some(DEFAULT_ACL.to_string()),
            ..Default::default()
        };
        if let Some(filename) = filename.as_deref() {
            if !is_image(filename) {
                put.content_disposition = Some(content_disposition(filename));
            }
        }
        put.content_type = content_type;

        let path = self.client.upload(file, path, put).await?;
        Ok(format!("{}/{}", self.absolute_base_url(), path))
    }

    async fn remove_file(&self, url: &str, path: &str) -> Result<()> {
        if !self.has_been_uploaded(url) {
            return Ok(());
        }
        self.client.remove(path, true).await?;
        Ok(())
    }

    fn has_been_uploaded(&self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        let Some(host) = url_hostname(url) else {
            return false;
        };

        if url_hostname(self.absolute_base_url()).as_deref() == Some(host.as_str()) {
            return true;
        }

        self.cdn_url
            .as_deref()
            .and_then(url_hostname)
            .map(|cdn_host| cdn_host == host)
            .unwrap_or(false)
    }

    fn absolute_base_url(&self) -> &str {
        self.base_url
            .get_or_init(|| format!("//{}.{}", self.client.bucket_name(), region_host(&self.region)))
    }

    fn upload_path(&self) -> String {
        format!("/uploads/{}", self.site_db)
    }

    fn is_external(&self) -> bool {
        true
    }

    fn path_for(&self, upload: &Upload) -> Option<PathBuf> {
        self.local.path_for(upload)
    }

    fn cdn_url(&self, url: &str) -> String {
        let Some(cdn) = self.cdn_url.as_deref() else {
            return url.to_string();
        };
        let from = format!("{}{}", scheme_token(url), self.absolute_base_url());
        url.replacen(&from, cdn, 1)
    }

    async fn cache_avatar(&self, avatar: &UserAvatar, user_id: i64) -> Result<()> {
        let source = self.strip_base_url(&avatar.url);
        let destination = self.strip_base_url(&self.avatar_template(avatar, user_id));
        self.client.copy(&source, &destination).await?;
        Ok(())
    }
}
