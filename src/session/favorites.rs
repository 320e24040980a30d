//! 收藏：以 place_id 为键的推荐条目集合，保持加入顺序
//!
//! toggle 对称：不在则加入，在则移除；连续两次 toggle 同一条目恢复原状。

use crate::models::RecommendationEntry;

#[derive(Clone, Debug, Default)]
pub struct Favorites {
    entries: Vec<RecommendationEntry>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换收藏状态，返回切换后是否为收藏
    pub fn toggle(&mut self, entry: &RecommendationEntry) -> bool {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.place_id == entry.place_id)
        {
            self.entries.remove(pos);
            false
        } else {
            self.entries.push(entry.clone());
            true
        }
    }

    pub fn is_favorite(&self, place_id: &str) -> bool {
        self.entries.iter().any(|e| e.place_id == place_id)
    }

    pub fn entries(&self) -> &[RecommendationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_own_inverse() {
        let mut favs = Favorites::new();
        let a = RecommendationEntry::new("A", "1 St");
        let b = RecommendationEntry::new("B", "2 St");
        favs.toggle(&a);
        let before: Vec<_> = favs.entries().to_vec();

        assert!(favs.toggle(&b));
        assert!(!favs.toggle(&b));
        assert_eq!(favs.entries(), before.as_slice());
    }

    #[test]
    fn test_no_duplicate_place_ids() {
        let mut favs = Favorites::new();
        let mut a = RecommendationEntry::new("A", "1 St");
        a.place_id = "p1".into();
        let mut a_resorted = a.clone();
        a_resorted.distance_text = "9 km".into();

        assert!(favs.toggle(&a));
        assert!(favs.is_favorite("p1"));
        // 同一 place_id（即使其他字段变化）视为同一条目
        assert!(!favs.toggle(&a_resorted));
        assert!(favs.is_empty());
    }
}
