//! 菜单扫描管线
//!
//! 1. 图片交给视觉模型解析；失败、非成功状态、格式错误或零条目 → 返回单元素兜底菜单（Failed）
//! 2. 每个菜品并发搜图（菜名 + 固定限定词），各自独立失败回退占位图；等待全部完成（join，非 race）
//! 3. 一次性返回完整列表；有配图回退时为 Degraded

use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::core::{Outcome, ProviderError};
use crate::models::{ImagePayload, MenuItem};
use crate::pipeline::fallback;
use crate::providers::{MenuExtractor, PhotoSearch};

/// 默认搜图限定词
pub const DEFAULT_PHOTO_QUALIFIER: &str = "food";

pub struct MenuScanPipeline {
    extractor: Arc<dyn MenuExtractor>,
    photos: Arc<dyn PhotoSearch>,
    qualifier: String,
}

impl MenuScanPipeline {
    pub fn new(extractor: Arc<dyn MenuExtractor>, photos: Arc<dyn PhotoSearch>) -> Self {
        Self {
            extractor,
            photos,
            qualifier: DEFAULT_PHOTO_QUALIFIER.to_string(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// 扫描图片，始终返回可展示的菜单
    pub async fn scan(&self, image: &ImagePayload) -> Outcome<Vec<MenuItem>> {
        let items = match self.extractor.extract(image).await {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                tracing::warn!("menu extraction returned zero items, using fallback menu");
                return Outcome::failed(
                    fallback::scan_error_menu(),
                    ProviderError::Empty("menu extraction"),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "menu extraction failed, using fallback menu");
                return Outcome::failed(fallback::scan_error_menu(), e);
            }
        };

        let (items, causes) = self.enrich(items).await;
        tracing::info!(
            items = items.len(),
            photo_fallbacks = causes.len(),
            "menu scan complete"
        );
        Outcome::from_causes(items, causes)
    }

    /// 从文件读取图片后扫描（相机 / 相册的替身）；读取失败同样返回兜底菜单
    pub async fn scan_file(&self, path: &Path) -> Outcome<Vec<MenuItem>> {
        match tokio::fs::read(path).await {
            Ok(bytes) if !bytes.is_empty() => {
                let image = ImagePayload::from_bytes(&bytes, ImagePayload::mime_for_path(path));
                self.scan(&image).await
            }
            Ok(_) => Outcome::failed(
                fallback::scan_error_menu(),
                ProviderError::InvalidInput(format!("{} is empty", path.display())),
            ),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read menu image");
                Outcome::failed(
                    fallback::scan_error_menu(),
                    ProviderError::InvalidInput(format!("cannot read {}: {}", path.display(), e)),
                )
            }
        }
    }

    /// 并发为每个菜品配图；返回配图后的列表与回退原因
    async fn enrich(&self, items: Vec<MenuItem>) -> (Vec<MenuItem>, Vec<ProviderError>) {
        let lookups = items.into_iter().map(|mut item| {
            let photos = Arc::clone(&self.photos);
            let query = format!("{} {}", item.name, self.qualifier);
            async move {
                match photos.find_photo(query.trim()).await {
                    Ok(url) => {
                        item.image_url = Some(url);
                        (item, None)
                    }
                    Err(e) => {
                        tracing::debug!(item = %item.name, error = %e, "photo lookup fell back");
                        item.image_url = Some(fallback::PLACEHOLDER_IMAGE_URL.to_string());
                        (item, Some(e))
                    }
                }
            }
        });

        let mut enriched = Vec::new();
        let mut causes = Vec::new();
        for (item, cause) in join_all(lookups).await {
            enriched.push(item);
            causes.extend(cause);
        }
        (enriched, causes)
    }
}
