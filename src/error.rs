//! Error types / 错误类型

use thiserror::Error;

/// OSS store errors / OSS 存储错误
#[derive(Debug, Error)]
pub enum OssError {
    /// A required constructor argument was blank / 参数无效
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A credential or region option was blank / 缺少配置项
    #[error("missing setting: {0}")]
    SettingMissing(String),

    /// A site-level setting was blank / 缺少站点设置
    #[error("missing site setting: {0}")]
    SiteSettingMissing(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// OSS answered with a non-2xx status / OSS 返回错误
    #[error("OSS error (HTTP {status}): {code} - {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("xml error: {0}")]
    Xml(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("config error: {0}")]
    Config(String),
}

impl From<quick_xml::DeError> for OssError {
    fn from(e: quick_xml::DeError) -> Self {
        OssError::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OssError>;
