//! 本地美食推荐管线
//!
//! 1. （可选）LLM 把自由文本偏好改写为简洁的搜索词；失败或未启用时用原文
//! 2. 按位置做地点文本搜索；零结果或失败 → 5 个演示餐厅（Failed）
//! 3. 截取前 max_results 个（服务端排名）
//! 4. 一次距离矩阵请求覆盖全部目的地，按 place_id 合并；失败或非 OK 元素填 Unknown
//! 5. （可选）按距离升序重排，无法解析的排最后

use std::sync::Arc;

use crate::core::{Outcome, ProviderError};
use crate::llm::{LlmClient, Message};
use crate::models::{Location, RecommendationEntry};
use crate::pipeline::{fallback, ranking};
use crate::providers::{DistanceMatrix, PlaceSearch};

const REFINE_PROMPT: &str = "You turn a diner's free-text craving into a concise search query \
for a maps place search (at most 6 words, e.g. \"cheap spicy ramen\"). \
Reply with the query only, no quotes or punctuation.";

/// 推荐条数上限；距离矩阵单次请求也至多覆盖这么多目的地
pub const DEFAULT_MAX_RESULTS: usize = 5;

pub struct LocalFoodPipeline {
    refiner: Option<Arc<dyn LlmClient>>,
    places: Arc<dyn PlaceSearch>,
    distances: Arc<dyn DistanceMatrix>,
    max_results: usize,
    sort_by_distance: bool,
}

impl LocalFoodPipeline {
    pub fn new(places: Arc<dyn PlaceSearch>, distances: Arc<dyn DistanceMatrix>) -> Self {
        Self {
            refiner: None,
            places,
            distances,
            max_results: DEFAULT_MAX_RESULTS,
            sort_by_distance: true,
        }
    }

    /// 启用查询改写
    pub fn with_refiner(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.refiner = Some(llm);
        self
    }

    /// 条数夹到 1..=DEFAULT_MAX_RESULTS
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        if max_results > DEFAULT_MAX_RESULTS {
            tracing::warn!(
                requested = max_results,
                cap = DEFAULT_MAX_RESULTS,
                "max_results above cap, clamped"
            );
        }
        self.max_results = max_results.clamp(1, DEFAULT_MAX_RESULTS);
        self
    }

    pub fn with_sort_by_distance(mut self, enabled: bool) -> Self {
        self.sort_by_distance = enabled;
        self
    }

    /// 搜索推荐，始终返回可展示的列表
    pub async fn search(
        &self,
        preferences: &str,
        location: &Location,
    ) -> Outcome<Vec<RecommendationEntry>> {
        let mut causes = Vec::new();
        let preferences = match preferences.trim() {
            "" => fallback::DEFAULT_PREFERENCE,
            p => p,
        };
        let query = self.refine(preferences, &mut causes).await;

        let places = match self.places.search(&query, location).await {
            Ok(places) if !places.is_empty() => places,
            Ok(_) => {
                tracing::warn!(query = %query, "place search returned no results, using demo set");
                return Outcome::failed(
                    fallback::demo_recommendations(),
                    ProviderError::Empty("place search"),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "place search failed, using demo set");
                return Outcome::failed(fallback::demo_recommendations(), e);
            }
        };

        let mut entries: Vec<RecommendationEntry> = places
            .into_iter()
            .take(self.max_results)
            .map(|mut e| {
                e.ensure_place_id();
                e
            })
            .collect();

        match self.distances.legs(location, &entries).await {
            Ok(legs) => ranking::merge_distances(&mut entries, &legs),
            Err(e) => {
                tracing::warn!(error = %e, "distance lookup failed, distances unknown");
                ranking::mark_all_unknown(&mut entries);
                causes.push(e);
            }
        }

        if self.sort_by_distance {
            ranking::sort_by_distance(&mut entries);
        }

        tracing::info!(query = %query, results = entries.len(), "local food search complete");
        Outcome::from_causes(entries, causes)
    }

    /// 改写查询；失败时记录原因并回退为原文
    async fn refine(&self, preferences: &str, causes: &mut Vec<ProviderError>) -> String {
        let Some(llm) = &self.refiner else {
            return preferences.to_string();
        };
        let messages = vec![
            Message::system(REFINE_PROMPT),
            Message::user(format!("Craving:\n{}", preferences)),
        ];
        match llm.complete(&messages).await {
            Ok(refined) => {
                let refined = clean_query(&refined);
                if refined.is_empty() {
                    preferences.to_string()
                } else {
                    tracing::debug!(raw = preferences, refined = %refined, "query refined");
                    refined
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "query refinement failed, using raw preference");
                causes.push(e);
                preferences.to_string()
            }
        }
    }
}

/// 取模型回复首行，去掉包裹的引号与末尾标点
fn clean_query(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .trim_end_matches(['.', '!'])
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}
