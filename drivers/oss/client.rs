//! OSS 客户端封装
//!
//! 持有存储桶、目录前缀与凭证，提供 upload / remove / copy / 生命周期 原语。
//! 无重试，传输错误直接返回给调用方。

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, DATE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::config::{BucketRef, OssCredentials, OssOptionOverrides, OssOptions, PutOptions};
use super::sign;
use crate::config::SiteSettings;
use crate::error::{OssError, Result};
use crate::utils::join_path;

/// 墓碑清理规则 ID
pub const TOMBSTONE_RULE_ID: &str = "purge-tombstone";

/// 对象存储原语，OssStore 通过它访问远端
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// 存储桶名称（不含目录）
    fn bucket_name(&self) -> &str;

    /// 上传完整内容，返回实际写入的对象键
    async fn upload(&self, file: Bytes, path: &str, options: PutOptions) -> Result<String>;

    /// 删除对象；copy_to_tombstone 为 true 时先复制到墓碑目录
    async fn remove(&self, path: &str, copy_to_tombstone: bool) -> Result<()>;

    /// 服务端复制（对象键按原样使用），返回目标键
    async fn copy(&self, source: &str, destination: &str) -> Result<String>;

    /// 设置墓碑目录的过期规则
    async fn update_tombstone_lifecycle(&self, grace_period_days: u32) -> Result<()>;
}

fn header_value<'a>(headers: &'a [(&'static str, String)], name: &str) -> &'a str {
    headers
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

/// OSS 错误响应体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// 存储桶生命周期配置（保留常用字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename = "LifecycleConfiguration")]
pub struct LifecycleConfiguration {
    #[serde(rename = "Rule", default)]
    pub rules: Vec<LifecycleRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LifecycleRule {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Prefix", default)]
    pub prefix: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Expiration", skip_serializing_if = "Option::is_none", default)]
    pub expiration: Option<LifecycleExpiration>,
    #[serde(rename = "AbortMultipartUpload", skip_serializing_if = "Option::is_none", default)]
    pub abort_multipart_upload: Option<LifecycleExpiration>,
    #[serde(rename = "Transition", skip_serializing_if = "Vec::is_empty", default)]
    pub transitions: Vec<LifecycleTransition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LifecycleExpiration {
    #[serde(rename = "Days", skip_serializing_if = "Option::is_none", default)]
    pub days: Option<u32>,
    #[serde(rename = "CreatedBeforeDate", skip_serializing_if = "Option::is_none", default)]
    pub created_before_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LifecycleTransition {
    #[serde(rename = "Days", skip_serializing_if = "Option::is_none", default)]
    pub days: Option<u32>,
    #[serde(rename = "StorageClass", default)]
    pub storage_class: String,
}

/// OSS 客户端
pub struct OssClient {
    bucket: BucketRef,
    region: String,
    tombstone_prefix: String,
    options: OssOptions,
    scheme: String,
    authority: String,
    http: Client,
}

impl OssClient {
    /// 创建客户端
    /// bucket_spec: "bucket" 或 "bucket/folder"
    pub fn new(
        bucket_spec: &str,
        tombstone_prefix: &str,
        credentials: OssCredentials,
        overrides: OssOptionOverrides,
    ) -> Result<Self> {
        let options = OssOptions::defaults(&credentials).merge(overrides);
        let bucket = BucketRef::parse(bucket_spec)?;

        let tombstone_prefix = match &bucket.folder_path {
            Some(folder) if !tombstone_prefix.is_empty() => join_path(folder, tombstone_prefix),
            _ => tombstone_prefix.to_string(),
        };

        Self::check_missing_options(&options, &credentials.region)?;

        let endpoint = Url::parse(&options.endpoint)?;
        let host = endpoint
            .host_str()
            .ok_or_else(|| OssError::Config(format!("endpoint has no host: {}", options.endpoint)))?;
        let authority = match endpoint.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut builder = Client::builder();
        if let Some(secs) = options.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self {
            bucket,
            region: credentials.region,
            tombstone_prefix,
            scheme: endpoint.scheme().to_string(),
            authority,
            options,
            http,
        })
    }

    /// 从站点设置创建
    pub fn from_settings(settings: &SiteSettings, bucket_spec: &str, tombstone_prefix: &str) -> Result<Self> {
        Self::new(
            bucket_spec,
            tombstone_prefix,
            OssCredentials::from_settings(settings),
            OssOptionOverrides::from_settings(settings),
        )
    }

    fn check_missing_options(options: &OssOptions, region: &str) -> Result<()> {
        if options.access_key_id.trim().is_empty() {
            return Err(OssError::SettingMissing("access_key_id".to_string()));
        }
        if options.access_key_secret.trim().is_empty() {
            return Err(OssError::SettingMissing("access_key_secret".to_string()));
        }
        if region.trim().is_empty() {
            return Err(OssError::SettingMissing("region".to_string()));
        }
        Ok(())
    }

    pub fn folder_path(&self) -> Option<&str> {
        self.bucket.folder_path.as_deref()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn tombstone_prefix(&self) -> &str {
        &self.tombstone_prefix
    }

    /// 加上目录前缀后的对象键
    pub fn path_for_oss_upload(&self, path: &str) -> String {
        match &self.bucket.folder_path {
            Some(folder) => join_path(folder, path),
            None => path.to_string(),
        }
    }

    /// 对象访问 URL（虚拟主机风格或路径风格）
    pub(crate) fn object_url(&self, key: &str, sub_resource: Option<&str>) -> String {
        let encoded = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let url = if self.options.force_path_style {
            format!("{}://{}/{}/{}", self.scheme, self.authority, self.bucket.name, encoded)
        } else {
            format!("{}://{}.{}/{}", self.scheme, self.bucket.name, self.authority, encoded)
        };
        match sub_resource {
            Some(sub) => format!("{}?{}", url, sub),
            None => url,
        }
    }

    /// 签名并发送请求，非 2xx 转为 OssError::Remote
    async fn send(
        &self,
        method: Method,
        key: &str,
        sub_resource: Option<&str>,
        headers: Vec<(&'static str, String)>,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let date = sign::http_date(Utc::now());
        let signed_headers: Vec<(String, String)> =
            headers.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let resource = sign::canonicalized_resource(&self.bucket.name, key, sub_resource);
        let string_to_sign = sign::string_to_sign(
            method.as_str(),
            header_value(&headers, "content-md5"),
            header_value(&headers, "content-type"),
            &date,
            &signed_headers,
            &resource,
        );
        let auth = sign::authorization(
            &self.options.access_key_id,
            &self.options.access_key_secret,
            &string_to_sign,
        );

        let mut header_map = HeaderMap::new();
        for (name, value) in headers.iter() {
            header_map.insert(HeaderName::from_static(*name), HeaderValue::from_str(value)?);
        }
        header_map.insert(DATE, HeaderValue::from_str(&date)?);
        header_map.insert(AUTHORIZATION, HeaderValue::from_str(&auth)?);

        let url = self.object_url(key, sub_resource);
        let mut request = self.http.request(method.clone(), &url).headers(header_map);
        if let Some(body) = body {
            request = request.body(body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        tracing::debug!("OSS {} {} -> {}", method, url, status);

        if status.is_success() {
            Ok(resp)
        } else {
            Err(Self::remote_error(status, resp).await)
        }
    }

    async fn remote_error(status: StatusCode, resp: Response) -> OssError {
        let text = resp.text().await.unwrap_or_default();
        let body: ErrorBody = quick_xml::de::from_str(&text).unwrap_or_default();
        let code = if body.code.is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            body.code
        };
        let message = if body.message.is_empty() { text } else { body.message };
        OssError::Remote { status: status.as_u16(), code, message }
    }

    /// 服务端复制，两个键均为完整对象键
    async fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<()> {
        let copy_source = format!("/{}/{}", self.bucket.name, urlencoding::encode(source_key));
        tracing::debug!("OSS CopyObject: src={}, dst={}", source_key, destination_key);
        self.send(
            Method::PUT,
            destination_key,
            None,
            vec![("x-oss-copy-source", copy_source)],
            None,
        )
        .await?;
        Ok(())
    }

    /// 对象是否存在（HEAD）
    pub async fn exists(&self, path: &str) -> Result<bool> {
        let key = self.path_for_oss_upload(path);
        match self.send(Method::HEAD, &key, None, Vec::new(), None).await {
            Ok(_) => Ok(true),
            Err(OssError::Remote { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 读取存储桶生命周期配置，未配置时返回空
    pub async fn get_lifecycle(&self) -> Result<LifecycleConfiguration> {
        match self.send(Method::GET, "", Some("lifecycle"), Vec::new(), None).await {
            Ok(resp) => {
                let text = resp.text().await?;
                Ok(quick_xml::de::from_str(&text)?)
            }
            Err(OssError::Remote { status: 404, .. }) => Ok(LifecycleConfiguration::default()),
            Err(e) => Err(e),
        }
    }

    /// 写入存储桶生命周期配置
    pub async fn put_lifecycle(&self, config: &LifecycleConfiguration) -> Result<()> {
        let xml = quick_xml::se::to_string(config)?;
        let body = Bytes::from(xml);
        let headers = vec![
            ("content-md5", sign::content_md5(&body)),
            ("content-type", "application/xml".to_string()),
        ];
        self.send(Method::PUT, "", Some("lifecycle"), headers, Some(body)).await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectClient for OssClient {
    fn bucket_name(&self) -> &str {
        &self.bucket.name
    }

    async fn upload(&self, file: Bytes, path: &str, options: PutOptions) -> Result<String> {
        let key = self.path_for_oss_upload(path);

        let mut headers = vec![("content-md5", sign::content_md5(&file))];
        if let Some(content_type) = options.content_type {
            headers.push(("content-type", content_type));
        }
        if let Some(disposition) = options.content_disposition {
            headers.push(("content-disposition", disposition));
        }
        if let Some(acl) = options.acl {
            headers.push(("x-oss-object-acl", acl));
        }

        tracing::debug!("OSS PutObject: key={}, size={}", key, file.len());
        self.send(Method::PUT, &key, None, headers, Some(file)).await?;
        Ok(key)
    }

    async fn remove(&self, path: &str, copy_to_tombstone: bool) -> Result<()> {
        let key = self.path_for_oss_upload(path);

        if copy_to_tombstone && !self.tombstone_prefix.is_empty() {
            let tombstone_key = join_path(&self.tombstone_prefix, path);
            self.copy_object(&key, &tombstone_key).await?;
        }

        tracing::debug!("OSS DeleteObject: key={}", key);
        self.send(Method::DELETE, &key, None, Vec::new(), None).await?;
        Ok(())
    }

    async fn copy(&self, source: &str, destination: &str) -> Result<String> {
        self.copy_object(source, destination).await?;
        Ok(destination.to_string())
    }

    async fn update_tombstone_lifecycle(&self, grace_period_days: u32) -> Result<()> {
        if self.tombstone_prefix.is_empty() {
            return Ok(());
        }

        let mut config = self.get_lifecycle().await?;
        config.rules.retain(|rule| rule.id != TOMBSTONE_RULE_ID);
        config.rules.push(LifecycleRule {
            id: TOMBSTONE_RULE_ID.to_string(),
            prefix: self.tombstone_prefix.clone(),
            status: "Enabled".to_string(),
            expiration: Some(LifecycleExpiration {
                days: Some(grace_period_days),
                created_before_date: None,
            }),
            ..Default::default()
        });

        tracing::info!(
            "Updating tombstone lifecycle: prefix={}, days={}",
            self.tombstone_prefix,
            grace_period_days
        );
        self.put_lifecycle(&config).await
    }
}
