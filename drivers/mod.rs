// Store drivers / 存储驱动
pub mod local;
pub mod oss;

use crate::storage::StoreManager;

/// Register all store factories / 注册所有存储工厂
pub async fn register_all(manager: &StoreManager) -> anyhow::Result<()> {
    // Register Aliyun OSS store / 注册阿里云OSS存储
    manager.register_factory(Box::new(oss::OssStoreFactory)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteSettings;
    use crate::error::OssError;

    fn enabled_settings() -> SiteSettings {
        SiteSettings {
            enable_oss_uploads: true,
            oss_region: "oss-cn-hangzhou".to_string(),
            oss_access_key_id: "id".to_string(),
            oss_access_key_secret: "secret".to_string(),
            oss_upload_bucket: "Media".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_all() {
        let manager = StoreManager::new();
        register_all(&manager).await.unwrap();
        assert_eq!(manager.factory_types().await, vec!["oss".to_string()]);

        let items = manager.config_items("oss").await.unwrap();
        assert!(items.iter().any(|item| item.name == "oss_upload_bucket" && item.required));
        assert!(manager.config_items("s3").await.is_none());
    }

    #[tokio::test]
    async fn test_select_store_honors_flags() {
        let manager = StoreManager::new();
        register_all(&manager).await.unwrap();

        let store = manager.select_store(&enabled_settings()).await.unwrap().unwrap();
        assert_eq!(store.name(), "oss");
        assert!(store.is_external());
        assert_eq!(store.absolute_base_url(), "//media.oss-cn-hangzhou.aliyuncs.com");

        let s3_wins = SiteSettings { enable_s3_uploads: true, ..enabled_settings() };
        assert!(manager.select_store(&s3_wins).await.unwrap().is_none());

        let disabled = SiteSettings { enable_oss_uploads: false, ..enabled_settings() };
        assert!(manager.select_store(&disabled).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_store_errors() {
        let manager = StoreManager::new();
        register_all(&manager).await.unwrap();

        assert!(manager.create_store("webdav", &enabled_settings()).await.is_err());

        let no_bucket = SiteSettings { oss_upload_bucket: String::new(), ..enabled_settings() };
        let err = manager.create_store("oss", &no_bucket).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<OssError>(),
            Some(OssError::SiteSettingMissing(name)) if name == "oss_upload_bucket"
        ));
    }
}
