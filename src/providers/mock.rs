//! Mock 适配器（mock_mode 使用，无需 API Key 与网络）
//!
//! 返回固定的演示菜单、演示餐厅与递增的距离，便于本地跑通完整流程。

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::ProviderError;
use crate::models::{synthesize_id, ImagePayload, Location, MenuItem, RecommendationEntry};
use crate::pipeline::fallback;
use crate::providers::{
    DistanceMatrix, MenuExtractor, PhotoSearch, PlaceSearch, SpeechSynthesizer, TravelLeg,
};

#[derive(Debug, Default)]
pub struct MockMenuExtractor;

#[async_trait]
impl MenuExtractor for MockMenuExtractor {
    async fn extract(&self, image: &ImagePayload) -> Result<Vec<MenuItem>, ProviderError> {
        if image.is_empty() {
            return Err(ProviderError::InvalidInput("empty image payload".to_string()));
        }
        Ok(vec![
            MenuItem::new("1", "Margherita Pizza", "Tomato, mozzarella, basil", 9.5),
            MenuItem::new("2", "Spaghetti Carbonara", "Egg, pecorino, guanciale", 11.0),
            MenuItem::new("3", "Caesar Salad", "Romaine, parmesan, croutons", 7.25),
            MenuItem::new("4", "Tiramisu", "Coffee-soaked sponge, mascarpone", 0.0),
        ])
    }
}

/// 按查询生成确定性的占位图 URL
#[derive(Debug, Default)]
pub struct MockPhotoSearch;

#[async_trait]
impl PhotoSearch for MockPhotoSearch {
    async fn find_photo(&self, query: &str) -> Result<String, ProviderError> {
        Ok(format!(
            "https://images.example.com/{}.jpg",
            synthesize_id(&[query])
        ))
    }
}

/// 返回演示餐厅（与兜底数据相同的一组，但以成功结果给出）
#[derive(Debug, Default)]
pub struct MockPlaceSearch;

#[async_trait]
impl PlaceSearch for MockPlaceSearch {
    async fn search(
        &self,
        _query: &str,
        _location: &Location,
    ) -> Result<Vec<RecommendationEntry>, ProviderError> {
        Ok(fallback::demo_recommendations()
            .into_iter()
            .map(|mut e| {
                e.distance_text = fallback::UNKNOWN.to_string();
                e.travel_time_text = fallback::UNKNOWN.to_string();
                e
            })
            .collect())
    }
}

/// 第 i 个目的地距离 (i+1)*0.6 km，时长 (i+1)*3 分钟
#[derive(Debug, Default)]
pub struct MockDistanceMatrix;

#[async_trait]
impl DistanceMatrix for MockDistanceMatrix {
    async fn legs(
        &self,
        _origin: &Location,
        destinations: &[RecommendationEntry],
    ) -> Result<HashMap<String, TravelLeg>, ProviderError> {
        Ok(destinations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let n = (i + 1) as f64;
                (
                    d.place_id.clone(),
                    TravelLeg::Known {
                        distance_text: format!("{:.1} km", n * 0.6),
                        duration_text: format!("{} mins", (i + 1) * 3),
                    },
                )
            })
            .collect())
    }
}

/// 不产生真实音频：返回文本的 UTF-8 字节
#[derive(Debug, Default)]
pub struct MockSpeech;

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidInput("nothing to speak".to_string()));
        }
        Ok(text.as_bytes().to_vec())
    }
}
