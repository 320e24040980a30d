//! 外部服务适配器：每种能力一个薄封装，固定请求形状，失败统一返回 ProviderError
//!
//! - **vision**: 菜单照片 → 结构化菜单项（OpenAI 兼容视觉模型）
//! - **pexels**: 菜名 → 配图 URL
//! - **places**: 文本 + 位置 → 餐厅列表（Google Places Text Search）
//! - **distance**: 起点 + 至多 5 个目的地 → 距离/时长（Google Distance Matrix，单次批量）
//! - **speech**: 文本 → 音频（OpenAI 兼容 TTS）
//! - **mock**: mock_mode 下的本地实现

pub mod distance;
pub mod http;
pub mod mock;
pub mod pexels;
pub mod places;
pub mod speech;
pub mod traits;
pub mod vision;

pub use distance::GoogleDistanceMatrix;
pub use http::build_client;
pub use mock::{MockDistanceMatrix, MockMenuExtractor, MockPhotoSearch, MockPlaceSearch, MockSpeech};
pub use pexels::PexelsPhotoSearch;
pub use places::GooglePlaceSearch;
pub use speech::OpenAiSpeech;
pub use traits::{DistanceMatrix, MenuExtractor, PhotoSearch, PlaceSearch, SpeechSynthesizer, TravelLeg};
pub use vision::VisionMenuExtractor;
