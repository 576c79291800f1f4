//! 阿里云 OSS 存储驱动

pub mod client;
pub mod config;
pub mod factory;
pub mod sign;
pub mod store;

pub use client::{ObjectClient, OssClient};
pub use config::{OssCredentials, OssOptionOverrides, PutOptions, TOMBSTONE_PREFIX};
pub use factory::OssStoreFactory;
pub use store::OssStore;
