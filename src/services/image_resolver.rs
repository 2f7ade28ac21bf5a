//! 图片解析服务 - 业务能力层
//!
//! 只负责把一个图片引用变成模型可用的 URL，不关心流程

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::{debug, warn};

use crate::config::{Config, DEFAULT_PLACEHOLDER_PATTERNS};
use crate::error::{GradingError, Result};
use crate::models::ImageRef;

/// 占位 URL 策略（可配置的黑名单）
#[derive(Debug, Clone)]
pub struct PlaceholderPolicy {
    patterns: Vec<String>,
}

impl PlaceholderPolicy {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    /// URL（忽略大小写）包含任一黑名单子串即视为占位 URL
    pub fn is_placeholder(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.patterns.iter().any(|p| url.contains(p.as_str()))
    }
}

impl Default for PlaceholderPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_PATTERNS)
    }
}

/// 图片解析服务
///
/// 职责：
/// - 远程 URL：过滤占位 URL，其余原样透传
/// - 本地文件：读取并编码为 base64 data URI
/// - 单张图片失败只记录警告，返回 None，不中断评分
pub struct ImageResolver {
    policy: PlaceholderPolicy,
}

impl ImageResolver {
    pub fn new(policy: PlaceholderPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(PlaceholderPolicy::new(config.placeholder_patterns.clone()))
    }

    /// 解析单个图片引用，失败时返回 None
    pub async fn resolve(&self, image: &ImageRef) -> Option<String> {
        match self.try_resolve(image).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("⚠️ 跳过图片: {}", e);
                None
            }
        }
    }

    async fn try_resolve(&self, image: &ImageRef) -> Result<String> {
        match image {
            ImageRef::Remote(url) => {
                if self.policy.is_placeholder(url) {
                    return Err(GradingError::PlaceholderUrl { url: url.clone() });
                }
                Ok(url.clone())
            }
            ImageRef::Local(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| GradingError::image_read(path.display().to_string(), e))?;
                debug!("读取本地图片 {} ({} 字节)", path.display(), bytes.len());
                Ok(to_data_uri(path, &bytes))
            }
        }
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(PlaceholderPolicy::default())
    }
}

/// 根据扩展名推断 MIME 类型：jpg/jpeg 统一为 image/jpeg，其余为 image/{ext}，无扩展名按 png 处理
pub fn mime_type_for(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "png".to_string());
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        other => format!("image/{}", other),
    }
}

fn to_data_uri(path: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type_for(path), STANDARD.encode(bytes))
}
