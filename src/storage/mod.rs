use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration item definition / 配置项定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    /// Display title (friendly name) / 显示标题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ConfigItem {
    pub fn new(name: &str, item_type: &str) -> Self {
        Self {
            name: name.to_string(),
            title: None,
            item_type: item_type.to_string(),
            default: None,
            required: false,
            help: None,
        }
    }

    pub fn title(mut self, val: &str) -> Self {
        self.title = Some(val.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, val: &str) -> Self {
        self.default = Some(val.to_string());
        self
    }

    pub fn help(mut self, val: &str) -> Self {
        self.help = Some(val.to_string());
        self
    }
}

/// Uploaded file record owned by the host / 上传记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Upload {
    pub id: i64,
    pub sha1: String,
    /// Extension without the leading dot / 扩展名（不含点）
    pub extension: String,
    pub original_filename: String,
    #[serde(default)]
    pub url: String,
}

/// Optimized (resized) image record / 优化图片记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizedImage {
    pub upload: Upload,
    pub version: Option<u32>,
    pub width: u32,
    pub height: u32,
    /// Extension with the leading dot, e.g. ".png" / 扩展名（含点）
    pub extension: String,
    #[serde(default)]
    pub url: String,
}

/// User avatar record / 用户头像记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAvatar {
    pub upload_id: i64,
    pub width: u32,
    pub url: String,
}

/// Options for `store_file` / 存储文件选项
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Original filename, used for the attachment disposition / 原始文件名
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// Write a local cache copy before uploading / 上传前写入本地缓存
    pub cache_locally: bool,
}

/// Storage backend contract required by the host / 宿主要求的存储后端接口
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Backend name / 后端名称
    fn name(&self) -> &str;

    /// Store an upload, returns its URL / 存储上传文件
    async fn store_upload(&self, file: Bytes, upload: &Upload, content_type: Option<&str>) -> Result<String>;

    /// Store an optimized image, returns its URL / 存储优化图片
    async fn store_optimized_image(&self, file: Bytes, optimized_image: &OptimizedImage) -> Result<String>;

    /// Store bytes at a relative path, returns the absolute URL / 存储文件
    async fn store_file(&self, file: Bytes, path: &str, opts: StoreOptions) -> Result<String>;

    /// Remove a file previously stored by this backend / 删除文件
    async fn remove_file(&self, url: &str, path: &str) -> Result<()>;

    /// Whether the URL points into this backend / 是否由本后端存储
    fn has_been_uploaded(&self, url: &str) -> bool;

    /// Base URL every stored file lives under / 基础 URL
    fn absolute_base_url(&self) -> &str;

    /// Local upload path of the current site / 当前站点上传路径
    fn upload_path(&self) -> String;

    /// Files are not served from local disk / 是否为外部存储
    fn is_external(&self) -> bool;

    /// Local filesystem path of an upload, if it has one / 本地文件路径
    fn path_for(&self, upload: &Upload) -> Option<PathBuf>;

    /// Rewrite a stored URL for CDN delivery / CDN 地址转换
    fn cdn_url(&self, url: &str) -> String;

    /// Copy an avatar to its per-user location / 缓存头像
    async fn cache_avatar(&self, avatar: &UserAvatar, user_id: i64) -> Result<()>;
}

/// Directory depth of the sha tree for an id / 根据 id 计算目录深度
pub fn get_depth_for(id: i64) -> usize {
    if id <= 0 {
        return 0;
    }
    let depth = (id as f64 / 1000.0).log(16.0).ceil();
    if depth > 0.0 {
        depth as usize
    } else {
        0
    }
}

/// "{type}/{depth+1}X/{sha tree}{sha}{extension}"
pub fn get_path_for(kind: &str, id: i64, sha: &str, extension: &str) -> String {
    let depth = get_depth_for(id);
    let tree: String = sha.chars().take(depth).map(|c| format!("{}/", c)).collect();
    format!("{}/{}X/{}{}{}", kind, depth + 1, tree, sha, extension)
}

/// Relative path of an upload / 上传文件的相对路径
pub fn get_path_for_upload(upload: &Upload) -> String {
    get_path_for("original", upload.id, &upload.sha1, &format!(".{}", upload.extension))
}

/// Relative path of an optimized image / 优化图片的相对路径
pub fn get_path_for_optimized_image(optimized_image: &OptimizedImage) -> String {
    let upload = &optimized_image.upload;
    let version = optimized_image.version.unwrap_or(1);
    let extension = format!(
        "_{}_{}x{}{}",
        version, optimized_image.width, optimized_image.height, optimized_image.extension
    );
    get_path_for("optimized", upload.id, &upload.sha1, &extension)
}

/// Avatar URL for a user under the given base URL / 用户头像地址
pub fn external_avatar_url(base_url: &str, user_id: i64, upload_id: i64, size: u32) -> String {
    format!("{}/avatars/{}/{}/{}.png", base_url, user_id, upload_id, size)
}

pub mod manager;

pub use manager::{StoreBox, StoreFactory, StoreManager};

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "e9d71f5ee7c92d6dc9e92ffdad17b8bd49418f98";

    #[test]
    fn test_get_depth_for() {
        assert_eq!(get_depth_for(0), 0);
        assert_eq!(get_depth_for(1), 0);
        assert_eq!(get_depth_for(999), 0);
        assert_eq!(get_depth_for(1001), 1);
        assert_eq!(get_depth_for(15_999), 1);
        assert_eq!(get_depth_for(20_000), 2);
    }

    #[test]
    fn test_path_for_upload() {
        let upload = Upload {
            id: 42,
            sha1: SHA.to_string(),
            extension: "png".to_string(),
            ..Default::default()
        };
        assert_eq!(get_path_for_upload(&upload), format!("original/1X/{}.png", SHA));

        let deep = Upload { id: 5_000, ..upload };
        assert_eq!(get_path_for_upload(&deep), format!("original/2X/e/{}.png", SHA));
    }

    #[test]
    fn test_path_for_optimized_image() {
        let image = OptimizedImage {
            upload: Upload {
                id: 20_000,
                sha1: SHA.to_string(),
                extension: "jpg".to_string(),
                ..Default::default()
            },
            version: None,
            width: 100,
            height: 50,
            extension: ".jpg".to_string(),
            url: String::new(),
        };
        assert_eq!(
            get_path_for_optimized_image(&image),
            format!("optimized/3X/e/9/{}_1_100x50.jpg", SHA)
        );
    }

    #[test]
    fn test_external_avatar_url() {
        assert_eq!(
            external_avatar_url("//b.oss-cn-hangzhou.aliyuncs.com", 7, 12, 120),
            "//b.oss-cn-hangzhou.aliyuncs.com/avatars/7/12/120.png"
        );
    }
}
