//! Path and URL helper functions / 路径与 URL 工具函数

use url::Url;

/// Join two key segments with exactly one `/` between them / 用单个 / 连接路径
/// The trailing slash of `tail` is kept: join_path("a", "tombstone/") -> "a/tombstone/"
pub fn join_path(head: &str, tail: &str) -> String {
    let head = head.trim_end_matches('/');
    let tail = tail.trim_start_matches('/');
    if head.is_empty() {
        tail.to_string()
    } else if tail.is_empty() {
        format!("{}/", head)
    } else {
        format!("{}/{}", head, tail)
    }
}

/// Get file extension (lowercase) / 获取文件扩展名
pub fn get_ext(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Whether the filename looks like an image / 判断是否为图片
pub fn is_image(filename: &str) -> bool {
    if get_ext(filename).is_empty() {
        return false;
    }
    mime_guess::from_path(filename)
        .first_raw()
        .map(|mime| mime.starts_with("image/"))
        .unwrap_or(false)
}

/// Extract the host of an absolute or protocol-relative URL / 提取 URL 主机名
pub fn url_hostname(url: &str) -> Option<String> {
    let url = url.trim();
    let parsed = if url.starts_with("//") {
        Url::parse(&format!("http:{}", url))
    } else {
        Url::parse(url)
    };
    parsed
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Whether the URL is root-relative ("/uploads/..." but not "//host/...") / 是否为站内相对路径
pub fn is_root_relative(url: &str) -> bool {
    let mut chars = url.chars();
    matches!((chars.next(), chars.next()), (Some('/'), Some(c)) if c != '/')
}
