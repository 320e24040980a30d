//! 应用编排器：主控循环
//!
//! 负责：加载配置、按配置创建适配器与管线（真实服务 / Mock）、建立 cmd/state 两条通道，
//! 并在后台任务中逐条消费用户命令（扫描、找餐厅、购物篮、收藏、播报），每条处理完投影一次 UiState。
//! 命令串行处理；重复提交不会去重，只会排队。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::config::{load_config, AppConfig};
use crate::core::{AppPhase, Notice, Outcome, UiState};
use crate::llm::{LlmClient, MockLlmClient, OpenAiClient};
use crate::models::{format_money, Location, MenuItem, RecommendationEntry};
use crate::pipeline::fallback::SCAN_ERROR_ITEM_ID;
use crate::pipeline::{LocalFoodPipeline, MenuScanPipeline, NarrationService};
use crate::providers::{
    build_client, GoogleDistanceMatrix, GooglePlaceSearch, MockDistanceMatrix, MockMenuExtractor,
    MockPhotoSearch, MockPlaceSearch, MockSpeech, OpenAiSpeech, PexelsPhotoSearch,
    VisionMenuExtractor,
};
use crate::session::{Basket, Favorites};

/// 从 UI 发往编排器的用户命令（序号均从 0 开始）
#[derive(Debug, Clone)]
pub enum Command {
    /// 扫描菜单照片文件
    ScanMenu(PathBuf),
    /// 按偏好与位置找餐厅
    FindFood { preferences: String, location: String },
    /// 把当前菜单第 n 项加入购物篮
    AddToBasket(usize),
    /// 调整当前菜单第 n 项的数量
    AdjustQuantity { index: usize, delta: i64 },
    /// 从购物篮第 n 行取走一件
    RemoveFromBasket(usize),
    /// 切换推荐第 n 项的收藏状态
    ToggleFavorite(usize),
    /// 为当前菜单生成介绍
    Describe,
    /// 把介绍合成为语音并写入文件
    Speak(PathBuf),
    Checkout,
    /// 清空菜单、推荐与购物篮（收藏保留）
    Clear,
    Quit,
}

/// 全部管线，可多次调用共享
pub struct Services {
    pub menu_scan: MenuScanPipeline,
    pub local_food: LocalFoodPipeline,
    pub narration: NarrationService,
    pub currency: String,
}

impl Services {
    /// 按配置创建：mock_mode 时全部走 Mock，否则走真实服务（缺 Key 的适配器会直接降级）
    pub fn from_config(cfg: &AppConfig) -> Self {
        if cfg.app.mock_mode {
            tracing::warn!("mock_mode enabled, all providers are local mocks");
            let mut services = Self::mock();
            services.currency = cfg.ui.currency.clone();
            return services;
        }

        let client = build_client(cfg.http.timeout_secs);
        let llm = create_llm_from_config(cfg);

        let menu_scan = MenuScanPipeline::new(
            Arc::new(VisionMenuExtractor::new(client.clone(), &cfg.openai)),
            Arc::new(PexelsPhotoSearch::new(client.clone(), &cfg.pexels)),
        )
        .with_qualifier(cfg.pexels.qualifier.clone());

        let mut local_food = LocalFoodPipeline::new(
            Arc::new(GooglePlaceSearch::new(client.clone(), &cfg.google)),
            Arc::new(GoogleDistanceMatrix::new(client.clone(), &cfg.google)),
        )
        .with_max_results(cfg.pipeline.max_results)
        .with_sort_by_distance(cfg.pipeline.sort_by_distance);
        if cfg.pipeline.refine_query {
            if let Some(llm) = &llm {
                local_food = local_food.with_refiner(Arc::clone(llm));
            }
        }

        let speech = Arc::new(OpenAiSpeech::new(client, &cfg.openai));
        let narration = match llm {
            Some(llm) => NarrationService::new(llm, speech),
            None => NarrationService::without_llm(speech),
        };

        Self {
            menu_scan,
            local_food,
            narration,
            currency: cfg.ui.currency.clone(),
        }
    }

    /// 全 Mock 组合（mock_mode 与测试）
    pub fn mock() -> Self {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient);
        Self {
            menu_scan: MenuScanPipeline::new(Arc::new(MockMenuExtractor), Arc::new(MockPhotoSearch)),
            local_food: LocalFoodPipeline::new(
                Arc::new(MockPlaceSearch),
                Arc::new(MockDistanceMatrix),
            )
            .with_refiner(Arc::clone(&llm)),
            narration: NarrationService::new(llm, Arc::new(MockSpeech)),
            currency: "£".to_string(),
        }
    }
}

/// 有 OpenAI Key 时创建文本模型客户端；没有则返回 None（改写跳过，介绍用固定文案）
pub(crate) fn create_llm_from_config(cfg: &AppConfig) -> Option<Arc<dyn LlmClient>> {
    match cfg.openai.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            tracing::info!("Using OpenAI LLM ({})", cfg.openai.model);
            Some(Arc::new(OpenAiClient::new(
                &cfg.openai.base_url,
                &cfg.openai.model,
                key,
            )))
        }
        _ => {
            tracing::warn!("No OpenAI API key set, query refinement and narration disabled");
            None
        }
    }
}

/// 会话状态：当前菜单与推荐、购物篮、收藏、最近一次介绍
#[derive(Debug, Default)]
pub struct Session {
    pub menu: Vec<MenuItem>,
    pub recommendations: Vec<RecommendationEntry>,
    pub basket: Basket,
    pub favorites: Favorites,
    pub narrative: Option<String>,
}

impl Session {
    /// 投影为 UiState
    pub fn project(
        &self,
        phase: AppPhase,
        notice: Option<Notice>,
        input_locked: bool,
        currency: &str,
    ) -> UiState {
        UiState {
            phase,
            menu: self.menu.clone(),
            recommendations: self.recommendations.clone(),
            basket: self.basket.lines().to_vec(),
            basket_total: self.basket.total(),
            basket_count: self.basket.len(),
            favorites: self.favorites.entries().to_vec(),
            narrative: self.narrative.clone(),
            notice,
            input_locked,
            currency: currency.to_string(),
        }
    }
}

/// 命令执行期间显示的阶段
fn busy_phase(cmd: &Command) -> Option<AppPhase> {
    match cmd {
        Command::ScanMenu(_) => Some(AppPhase::Scanning),
        Command::FindFood { .. } => Some(AppPhase::Searching),
        Command::Describe => Some(AppPhase::Narrating),
        Command::Speak(_) => Some(AppPhase::Speaking),
        _ => None,
    }
}

/// 把管线结果转为提示：Success 为 Info，Degraded 为 Warning，Failed 为 Error
fn outcome_notice<T>(outcome: &Outcome<T>, success: String) -> Notice {
    match outcome {
        Outcome::Success(_) => Notice::info(success),
        Outcome::Degraded { causes, .. } => Notice::warning(format!(
            "{} ({} lookup(s) fell back: {})",
            success,
            causes.len(),
            causes.first().map(|c| c.to_string()).unwrap_or_default()
        )),
        Outcome::Failed { cause, .. } => {
            Notice::error(format!("{}; showing fallback results", cause))
        }
    }
}

/// 可介绍的菜名；扫描失败的占位项不算菜品
fn dish_names(menu: &[MenuItem]) -> Vec<String> {
    menu.iter()
        .filter(|m| m.id != SCAN_ERROR_ITEM_ID)
        .map(|m| m.name.clone())
        .collect()
}

/// 处理单条命令并返回提示；扫描与搜索永不失败，只会带着兜底数据返回
pub async fn handle_command(services: &Services, session: &mut Session, cmd: Command) -> Notice {
    match cmd {
        Command::ScanMenu(path) => {
            let outcome = services.menu_scan.scan_file(&path).await;
            let notice = outcome_notice(
                &outcome,
                format!("Found {} dish(es)", outcome.value().len()),
            );
            session.menu = outcome.into_value();
            session.narrative = None;
            notice
        }
        Command::FindFood {
            preferences,
            location,
        } => {
            let Some(location) = Location::parse(&location) else {
                return Notice::warning(
                    "Missing info: enter a postcode/area or \"lat,lon\" after @",
                );
            };
            let outcome = services.local_food.search(&preferences, &location).await;
            let notice = outcome_notice(
                &outcome,
                format!("{} place(s) near {}", outcome.value().len(), location),
            );
            session.recommendations = outcome.into_value();
            notice
        }
        Command::AddToBasket(index) => match session.menu.get(index) {
            Some(item) if item.id == SCAN_ERROR_ITEM_ID => {
                Notice::warning("This placeholder can't be ordered; try scanning again")
            }
            Some(item) => {
                let qty = session.basket.add(item.clone());
                Notice::info(format!("Added {} (x{}) to your basket", item.name, qty))
            }
            None => Notice::warning(format!("No menu item #{}", index + 1)),
        },
        Command::AdjustQuantity { index, delta } => match session.menu.get(index) {
            Some(item) if item.id == SCAN_ERROR_ITEM_ID => {
                Notice::warning("This placeholder can't be ordered; try scanning again")
            }
            Some(item) => {
                let qty = session.basket.adjust(item, delta);
                Notice::info(format!("{} x{}", item.name, qty))
            }
            None => Notice::warning(format!("No menu item #{}", index + 1)),
        },
        Command::RemoveFromBasket(index) => match session.basket.remove(index) {
            Some(item) => Notice::info(format!("Removed one {}", item.name)),
            None => Notice::warning(format!("No basket line #{}", index + 1)),
        },
        Command::ToggleFavorite(index) => match session.recommendations.get(index) {
            Some(entry) => {
                if session.favorites.toggle(entry) {
                    Notice::info(format!("Saved {} to favourites", entry.name))
                } else {
                    Notice::info(format!("Removed {} from favourites", entry.name))
                }
            }
            None => Notice::warning(format!("No recommendation #{}", index + 1)),
        },
        Command::Describe => {
            let outcome = services.narration.describe(&dish_names(&session.menu)).await;
            let notice = outcome_notice(&outcome, "Menu description ready".to_string());
            session.narrative = Some(outcome.into_value());
            notice
        }
        Command::Speak(path) => {
            let text = match session.narrative.clone() {
                Some(text) => text,
                None => {
                    let text = services
                        .narration
                        .describe(&dish_names(&session.menu))
                        .await
                        .into_value();
                    session.narrative = Some(text.clone());
                    text
                }
            };
            match services.narration.speak(&text).await {
                Ok(audio) => match tokio::fs::write(&path, &audio).await {
                    Ok(()) => Notice::info(format!(
                        "Saved {} bytes of audio to {}",
                        audio.len(),
                        path.display()
                    )),
                    Err(e) => Notice::error(format!("Cannot write {}: {}", path.display(), e)),
                },
                Err(e) => Notice::error(format!("Speech aborted: {}", e)),
            }
        }
        Command::Checkout => {
            if session.basket.is_empty() {
                return Notice::warning("Your basket is empty");
            }
            let order = session.basket.checkout();
            tracing::info!(lines = order.lines.len(), total = order.total, "order placed");
            Notice::info(format!(
                "Order sent at {}: {} line(s), total {}. Kitchen is preparing your food.",
                order.placed_at.format("%H:%M"),
                order.lines.len(),
                format_money(&services.currency, order.total)
            ))
        }
        Command::Clear => {
            session.menu.clear();
            session.recommendations.clear();
            session.basket.clear();
            session.narrative = None;
            Notice::info("Cleared")
        }
        Command::Quit => Notice::info("Bye"),
    }
}

/// 创建应用运行时：返回命令发送端与状态接收端；后台任务消费命令并更新 state。
pub async fn create_app(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(mpsc::UnboundedSender<Command>, watch::Receiver<UiState>)> {
    let cfg = load_config(config_path)
        .unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            AppConfig::default()
        })
        .resolve_credentials();

    let services = Services::from_config(&cfg);
    Ok(spawn_runtime(services))
}

/// 在后台任务中运行命令循环
pub fn spawn_runtime(
    services: Services,
) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    // 两通道：UI -> Core 命令；Core -> UI 状态快照
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let initial = UiState {
        currency: services.currency.clone(),
        ..UiState::default()
    };
    let (state_tx, state_rx) = watch::channel(initial);

    tokio::spawn(async move {
        let mut session = Session::default();
        while let Some(cmd) = cmd_rx.recv().await {
            if matches!(cmd, Command::Quit) {
                break;
            }
            if let Some(phase) = busy_phase(&cmd) {
                let _ = state_tx.send(session.project(phase, None, true, &services.currency));
            }

            let notice = handle_command(&services, &mut session, cmd).await;
            let phase = if notice.level == crate::core::NoticeLevel::Error {
                AppPhase::Error
            } else {
                AppPhase::Idle
            };
            let _ = state_tx.send(session.project(phase, Some(notice), false, &services.currency));
        }
        // cmd_tx 已关闭或收到 Quit，退出循环
    });

    (cmd_tx, state_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NoticeLevel;
    use crate::pipeline::fallback::GENERIC_NARRATIVE;

    #[tokio::test]
    async fn test_find_food_requires_location() {
        let services = Services::mock();
        let mut session = Session::default();
        let notice = handle_command(
            &services,
            &mut session,
            Command::FindFood {
                preferences: "tacos".into(),
                location: "  ".into(),
            },
        )
        .await;
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(session.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_find_food_then_favorite() {
        let services = Services::mock();
        let mut session = Session::default();
        let notice = handle_command(
            &services,
            &mut session,
            Command::FindFood {
                preferences: "".into(),
                location: "51.5,-0.1".into(),
            },
        )
        .await;
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(session.recommendations.len(), 5);
        assert_eq!(session.recommendations[0].distance_text, "0.6 km");

        handle_command(&services, &mut session, Command::ToggleFavorite(1)).await;
        let id = session.recommendations[1].place_id.clone();
        assert!(session.favorites.is_favorite(&id));
        handle_command(&services, &mut session, Command::ToggleFavorite(1)).await;
        assert!(session.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_scan_missing_file_gives_fallback_menu() {
        let services = Services::mock();
        let mut session = Session::default();
        let notice = handle_command(
            &services,
            &mut session,
            Command::ScanMenu(PathBuf::from("/definitely/not/here.jpg")),
        )
        .await;
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(session.menu.len(), 1);
        assert_eq!(session.menu[0].id, SCAN_ERROR_ITEM_ID);

        // 占位菜单项不可下单
        let notice = handle_command(&services, &mut session, Command::AddToBasket(0)).await;
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(session.basket.is_empty());
    }

    #[tokio::test]
    async fn test_speak_after_failed_scan_uses_generic_narrative() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("out.mp3");

        let services = Services::mock();
        let mut session = Session::default();
        handle_command(
            &services,
            &mut session,
            Command::ScanMenu(PathBuf::from("/definitely/not/here.jpg")),
        )
        .await;
        assert_eq!(session.menu[0].id, SCAN_ERROR_ITEM_ID);

        let notice = handle_command(&services, &mut session, Command::Speak(audio.clone())).await;
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(session.narrative.as_deref(), Some(GENERIC_NARRATIVE));
        let written = std::fs::read(&audio).unwrap();
        assert_eq!(written, GENERIC_NARRATIVE.as_bytes());
    }

    #[tokio::test]
    async fn test_remove_takes_one_unit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.jpg");
        std::fs::write(&path, b"fake-jpeg-bytes").unwrap();

        let services = Services::mock();
        let mut session = Session::default();
        handle_command(&services, &mut session, Command::ScanMenu(path)).await;
        handle_command(&services, &mut session, Command::AddToBasket(0)).await;
        handle_command(&services, &mut session, Command::AddToBasket(0)).await;

        let notice = handle_command(&services, &mut session, Command::RemoveFromBasket(0)).await;
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(session.basket.len(), 1);
        assert!((session.basket.total() - 9.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_scan_add_and_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.jpg");
        std::fs::write(&path, b"fake-jpeg-bytes").unwrap();

        let services = Services::mock();
        let mut session = Session::default();
        handle_command(&services, &mut session, Command::ScanMenu(path)).await;
        assert_eq!(session.menu.len(), 4);
        assert!(session.menu.iter().all(|m| m.image_url.is_some()));

        handle_command(&services, &mut session, Command::AddToBasket(0)).await;
        handle_command(&services, &mut session, Command::AdjustQuantity { index: 1, delta: 2 }).await;
        handle_command(&services, &mut session, Command::AdjustQuantity { index: 1, delta: -1 }).await;
        assert_eq!(session.basket.len(), 2);
        assert!((session.basket.total() - 20.5).abs() < 1e-9);

        let notice = handle_command(&services, &mut session, Command::Checkout).await;
        assert!(notice.text.contains("£20.50"));
        assert!(session.basket.is_empty());
    }

    #[tokio::test]
    async fn test_runtime_projects_state() {
        let (cmd_tx, mut state_rx) = spawn_runtime(Services::mock());
        cmd_tx
            .send(Command::FindFood {
                preferences: "pizza".into(),
                location: "Leeds".into(),
            })
            .unwrap();

        loop {
            state_rx.changed().await.unwrap();
            let state = state_rx.borrow().clone();
            if state.notice.is_some() {
                assert_eq!(state.phase, AppPhase::Idle);
                assert_eq!(state.recommendations.len(), 5);
                assert!(!state.input_locked);
                break;
            }
        }
        cmd_tx.send(Command::Quit).unwrap();
    }
}
