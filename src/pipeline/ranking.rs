//! 距离排序与合并
//!
//! 距离文本形如 "1.2 km" / "850 m" / "0.6 mi"：取开头的数字并按单位换算为公里；
//! 无法解析的条目排在最后（f64::MAX 哨兵），不报错。

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::RecommendationEntry;
use crate::pipeline::fallback::UNKNOWN;
use crate::providers::TravelLeg;

/// 无法解析的距离的排序键
pub const UNPARSEABLE_DISTANCE: f64 = f64::MAX;

static DISTANCE_RE: OnceLock<Regex> = OnceLock::new();

/// 解析距离文本为公里数
pub fn parse_distance_km(text: &str) -> Option<f64> {
    let re = DISTANCE_RE
        .get_or_init(|| Regex::new(r"^\s*(\d[\d,]*(?:\.\d+)?|\.\d+)\s*([A-Za-z]*)").unwrap());
    let caps = re.captures(text)?;
    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let km = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
        Some("m") | Some("meter") | Some("meters") | Some("metre") | Some("metres") => {
            number / 1000.0
        }
        Some("mi") | Some("mile") | Some("miles") => number * 1.609_344,
        Some("ft") | Some("feet") => number * 0.000_304_8,
        _ => number,
    };
    km.is_finite().then_some(km)
}

/// 排序键：可解析则为公里数，否则为 UNPARSEABLE_DISTANCE
pub fn distance_sort_key(text: &str) -> f64 {
    parse_distance_km(text).unwrap_or(UNPARSEABLE_DISTANCE)
}

/// 按距离升序稳定排序，无法解析的排最后
pub fn sort_by_distance(entries: &mut [RecommendationEntry]) {
    entries.sort_by(|a, b| {
        distance_sort_key(&a.distance_text).total_cmp(&distance_sort_key(&b.distance_text))
    });
}

/// 按 place_id 合并距离结果；没有对应结果或状态非 OK 的条目填 Unknown
pub fn merge_distances(entries: &mut [RecommendationEntry], legs: &HashMap<String, TravelLeg>) {
    for entry in entries.iter_mut() {
        match legs.get(&entry.place_id) {
            Some(TravelLeg::Known {
                distance_text,
                duration_text,
            }) => {
                entry.distance_text = distance_text.clone();
                entry.travel_time_text = duration_text.clone();
            }
            Some(TravelLeg::Unavailable { status }) => {
                tracing::debug!(place_id = %entry.place_id, status = %status, "distance unavailable");
                mark_unknown(entry);
            }
            None => mark_unknown(entry),
        }
    }
}

/// 距离调用整体失败时使用
pub fn mark_all_unknown(entries: &mut [RecommendationEntry]) {
    entries.iter_mut().for_each(mark_unknown);
}

fn mark_unknown(entry: &mut RecommendationEntry) {
    entry.distance_text = UNKNOWN.to_string();
    entry.travel_time_text = UNKNOWN.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_distance(name: &str, distance: &str) -> RecommendationEntry {
        let mut e = RecommendationEntry::new(name, format!("{} Street", name));
        e.distance_text = distance.to_string();
        e
    }

    #[test]
    fn test_parse_distance_units() {
        assert_eq!(parse_distance_km("1.2 km"), Some(1.2));
        assert_eq!(parse_distance_km("850 m"), Some(0.85));
        assert_eq!(parse_distance_km("1,204 km"), Some(1204.0));
        assert_eq!(parse_distance_km("2"), Some(2.0));
        let miles = parse_distance_km("1 mi").unwrap();
        assert!((miles - 1.609_344).abs() < 1e-9);
    }

    #[test]
    fn test_parse_distance_rejects_garbage() {
        assert_eq!(parse_distance_km("bad"), None);
        assert_eq!(parse_distance_km(""), None);
        assert_eq!(parse_distance_km(UNKNOWN), None);
        assert_eq!(distance_sort_key("bad"), UNPARSEABLE_DISTANCE);
    }

    #[test]
    fn test_sort_by_distance_unparseable_last() {
        let mut entries = vec![
            entry_with_distance("a", "2.0 km"),
            entry_with_distance("b", "0.5 km"),
            entry_with_distance("c", "bad"),
            entry_with_distance("d", "1.0 km"),
        ];
        sort_by_distance(&mut entries);
        let order: Vec<_> = entries.iter().map(|e| e.distance_text.as_str()).collect();
        assert_eq!(order, vec!["0.5 km", "1.0 km", "2.0 km", "bad"]);
    }

    #[test]
    fn test_sort_bad_first_still_last() {
        let mut entries = vec![
            entry_with_distance("c", "bad"),
            entry_with_distance("a", "300 m"),
            entry_with_distance("b", "0.2 km"),
        ];
        sort_by_distance(&mut entries);
        let order: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_merge_by_place_id_ignores_order() {
        let mut entries = vec![
            entry_with_distance("a", UNKNOWN),
            entry_with_distance("b", UNKNOWN),
        ];
        let mut legs = HashMap::new();
        // 插入顺序与条目顺序相反
        legs.insert(
            entries[1].place_id.clone(),
            TravelLeg::Known {
                distance_text: "2 km".into(),
                duration_text: "6 mins".into(),
            },
        );
        legs.insert(
            entries[0].place_id.clone(),
            TravelLeg::Unavailable {
                status: "ZERO_RESULTS".into(),
            },
        );
        merge_distances(&mut entries, &legs);
        assert_eq!(entries[0].distance_text, UNKNOWN);
        assert_eq!(entries[0].travel_time_text, UNKNOWN);
        assert_eq!(entries[1].distance_text, "2 km");
        assert_eq!(entries[1].travel_time_text, "6 mins");
    }
}
