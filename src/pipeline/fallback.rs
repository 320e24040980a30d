//! 兜底值：任何外部调用失败时替换进结果，保证界面总有可展示的内容

use crate::models::{MenuItem, RecommendationEntry};

/// 距离 / 时长未知时的哨兵文本
pub const UNKNOWN: &str = "Unknown";

/// 搜图失败时的占位图
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400";

/// 菜品介绍失败时的固定文案
pub const GENERIC_NARRATIVE: &str =
    "A tempting selection of freshly prepared dishes, full of flavour and made to share.";

/// 用户未填写偏好时使用的查询
pub const DEFAULT_PREFERENCE: &str = "Any good food";

/// 扫描失败占位菜单项的 id
pub const SCAN_ERROR_ITEM_ID: &str = "scan-error";

/// 扫描失败时返回的单元素列表
pub fn scan_error_menu() -> Vec<MenuItem> {
    let mut item = MenuItem::new(
        SCAN_ERROR_ITEM_ID,
        "Menu Unavailable",
        "We couldn't read this menu. Check your connection or try a clearer photo.",
        0.0,
    );
    item.image_url = Some(PLACEHOLDER_IMAGE_URL.to_string());
    vec![item]
}

/// 地点搜索无结果或失败时的 5 个演示餐厅（已按距离升序）
pub fn demo_recommendations() -> Vec<RecommendationEntry> {
    let demos: [(&str, &str, f64, u32, &str, &str); 5] = [
        ("The Corner Kitchen", "12 High Street, London", 4.5, 320, "0.3 km", "2 mins"),
        ("Golden Dragon", "48 Market Road, London", 4.3, 210, "0.7 km", "4 mins"),
        ("Pizzeria Napoli", "7 Station Parade, London", 4.6, 540, "1.1 km", "5 mins"),
        ("Spice Route", "90 Mill Lane, London", 4.4, 185, "1.6 km", "7 mins"),
        ("Green Bowl Cafe", "3 Park Terrace, London", 4.2, 96, "2.4 km", "9 mins"),
    ];
    demos
        .iter()
        .enumerate()
        .map(|(i, (name, address, rating, reviews, distance, duration))| {
            let mut entry = RecommendationEntry::new(*name, *address);
            entry.place_id = format!("demo-{}", i + 1);
            entry.rating = *rating;
            entry.review_count = *reviews;
            entry.photo_url = Some(PLACEHOLDER_IMAGE_URL.to_string());
            entry.distance_text = distance.to_string();
            entry.travel_time_text = duration.to_string();
            entry.is_open = Some(true);
            entry
        })
        .collect()
}
