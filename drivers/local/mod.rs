//! 本地存储：公共目录路径解析与下载缓存

use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::{OssError, Result};
use crate::storage::Upload;
use crate::utils::is_root_relative;

/// 本地公共目录
#[derive(Debug, Clone)]
pub struct LocalStore {
    public_dir: PathBuf,
}

impl LocalStore {
    pub fn new(public_dir: PathBuf) -> Self {
        Self { public_dir }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// "{public_dir}{upload.url}"，仅适用于站内相对路径
    pub fn path_for(&self, upload: &Upload) -> Option<PathBuf> {
        if !is_root_relative(&upload.url) {
            return None;
        }
        let relative = Path::new(upload.url.trim_start_matches('/'));
        // 不允许跳出公共目录
        if relative.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
            tracing::warn!("Rejected local path outside public dir: {}", upload.url);
            return None;
        }
        Some(self.public_dir.join(relative))
    }
}

/// 本地下载缓存，超过上限时删除最旧的文件
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
    max_files: usize,
}

impl LocalCache {
    pub fn new(dir: PathBuf, max_files: usize) -> Self {
        Self { dir, max_files }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 写入缓存文件，返回缓存路径
    pub async fn cache_file(&self, file: &Bytes, filename: &str) -> Result<PathBuf> {
        if filename.is_empty() || filename.contains('/') || filename.contains('\\') || filename == ".." {
            return Err(OssError::InvalidParameters(format!("cache filename: {}", filename)));
        }

        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        fs::write(&path, file).await?;
        tracing::debug!("Cached {} bytes at {:?}", file.len(), path);

        self.evict().await?;
        Ok(path)
    }

    /// 按修改时间删除超出上限的旧文件
    async fn evict(&self) -> Result<()> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(std::time::UNIX_EPOCH);
            files.push((modified, entry.path()));
        }

        if files.len() <= self.max_files {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files;
        for (_, path) in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path).await {
                tracing::warn!("Failed to evict cached file {:?}: {}", path, e);
            }
        }
        Ok(())
    }
}
