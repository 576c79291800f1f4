use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use anyhow::{anyhow, Result};

use super::{ConfigItem, FileStore};
use crate::config::SiteSettings;

pub type StoreBox = Arc<Box<dyn FileStore>>;

/// Store factory trait / 存储工厂 trait
pub trait StoreFactory: Send + Sync {
    /// Store type name / 存储类型名称
    fn store_type(&self) -> &'static str;

    /// Settings this store reads / 存储读取的设置项
    fn config_items(&self) -> Vec<ConfigItem>;

    /// Create a store instance / 创建存储实例
    fn create_store(&self, settings: &SiteSettings) -> Result<Box<dyn FileStore>>;
}

/// Store manager (factory registry and backend selection) / 存储管理器
#[derive(Clone, Default)]
pub struct StoreManager {
    factories: Arc<RwLock<HashMap<String, Arc<Box<dyn StoreFactory>>>>>,
}

impl StoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register store factory / 注册存储工厂
    pub async fn register_factory(&self, factory: Box<dyn StoreFactory>) -> Result<()> {
        let store_type = factory.store_type().to_string();
        let mut factories = self.factories.write().await;
        factories.insert(store_type.clone(), Arc::new(factory));

        tracing::info!("Store factory registered: {}", store_type);
        Ok(())
    }

    /// Registered store types, sorted / 已注册的存储类型
    pub async fn factory_types(&self) -> Vec<String> {
        let factories = self.factories.read().await;
        let mut types: Vec<String> = factories.keys().cloned().collect();
        types.sort();
        types
    }

    /// Settings items of a store type / 存储类型的设置项
    pub async fn config_items(&self, store_type: &str) -> Option<Vec<ConfigItem>> {
        let factories = self.factories.read().await;
        factories.get(store_type).map(|f| f.config_items())
    }

    /// Create store instance / 创建存储实例
    pub async fn create_store(&self, store_type: &str, settings: &SiteSettings) -> Result<StoreBox> {
        let factory = {
            let factories = self.factories.read().await;
            factories
                .get(store_type)
                .cloned()
                .ok_or_else(|| anyhow!("Store type not found: {}", store_type))?
        };

        match factory.create_store(settings) {
            Ok(store) => {
                tracing::info!("Store created: {}", store_type);
                Ok(Arc::new(store))
            }
            Err(e) => {
                tracing::error!("Store creation failed: {} - {}", store_type, e);
                Err(e)
            }
        }
    }

    /// Pick the OSS store when enabled and the S3 backend is not / 选择当前生效的存储
    /// Returns None when the host should keep its default store / 返回 None 表示使用默认存储
    pub async fn select_store(&self, settings: &SiteSettings) -> Result<Option<StoreBox>> {
        if !settings.oss_enabled() {
            tracing::debug!(
                "OSS store inactive (enable_oss_uploads={}, enable_s3_uploads={})",
                settings.enable_oss_uploads,
                settings.enable_s3_uploads
            );
            return Ok(None);
        }
        self.create_store("oss", settings).await.map(Some)
    }
}
