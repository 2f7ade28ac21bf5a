use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 图片引用：远程 URL 或本地文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageRef {
    /// http/https URL，由模型服务端直接拉取
    Remote(String),
    /// 本地文件，发送前转换为 base64 data URI
    Local(PathBuf),
}

impl ImageRef {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            ImageRef::Remote(raw.to_string())
        } else {
            ImageRef::Local(PathBuf::from(raw))
        }
    }

    /// 空引用（空字符串）在组装时直接跳过
    pub fn is_blank(&self) -> bool {
        match self {
            ImageRef::Remote(url) => url.trim().is_empty(),
            ImageRef::Local(path) => path.as_os_str().is_empty(),
        }
    }
}

impl From<&str> for ImageRef {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for ImageRef {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.to_string()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Remote(url) => write!(f, "{}", url),
            ImageRef::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
