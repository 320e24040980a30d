//! 适配器 trait：管线只依赖这些接口，测试与 mock_mode 可替换实现

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::ProviderError;
use crate::models::{ImagePayload, Location, MenuItem, RecommendationEntry};

/// 视觉菜单识别
#[async_trait]
pub trait MenuExtractor: Send + Sync {
    async fn extract(&self, image: &ImagePayload) -> Result<Vec<MenuItem>, ProviderError>;
}

/// 图库搜图：返回单张图片 URL
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    async fn find_photo(&self, query: &str) -> Result<String, ProviderError>;
}

/// 地点文本搜索：按服务端排名返回
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        location: &Location,
    ) -> Result<Vec<RecommendationEntry>, ProviderError>;
}

/// 单个目的地的距离矩阵结果
#[derive(Clone, Debug, PartialEq)]
pub enum TravelLeg {
    Known {
        distance_text: String,
        duration_text: String,
    },
    /// 服务端对该元素返回非 OK 状态（NOT_FOUND / ZERO_RESULTS 等）
    Unavailable { status: String },
}

/// 距离矩阵：一次请求覆盖全部目的地，结果按 place_id 索引
#[async_trait]
pub trait DistanceMatrix: Send + Sync {
    async fn legs(
        &self,
        origin: &Location,
        destinations: &[RecommendationEntry],
    ) -> Result<HashMap<String, TravelLeg>, ProviderError>;
}

/// 语音合成：返回完整音频字节
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}
