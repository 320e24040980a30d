//! 推荐编排：把适配器组合成两条管线，部分失败时用固定兜底数据替代
//!
//! - **menu_scan**: 菜单照片 → 视觉解析 → 并发配图
//! - **local_food**: 偏好 + 位置 → （可选）查询改写 → 地点搜索 → 批量距离 → 合并与排序
//! - **narration**: 菜品介绍与语音播报
//! - **ranking**: 距离文本解析、排序与按 place_id 合并
//! - **fallback**: 兜底值与哨兵值

pub mod fallback;
pub mod local_food;
pub mod menu_scan;
pub mod narration;
pub mod ranking;

pub use local_food::LocalFoodPipeline;
pub use menu_scan::MenuScanPipeline;
pub use narration::NarrationService;
