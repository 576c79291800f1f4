pub mod config;
pub mod error;
pub mod storage;
pub mod utils;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

pub use error::{OssError, Result};

// Register all file stores (call unified registration function from drivers module) / 注册所有文件存储
pub async fn register_file_stores(manager: &storage::StoreManager) -> anyhow::Result<()> {
    drivers::register_all(manager).await
}
