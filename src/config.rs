//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `FORKCAST__*` 覆盖（双下划线表示嵌套，如 `FORKCAST__GOOGLE__API_KEY=...`）。
//! 各服务的 API Key 只在 resolve_credentials 中读取一次，之后由构造函数注入各适配器。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub openai: OpenAiSection,
    #[serde(default)]
    pub pexels: PexelsSection,
    #[serde(default)]
    pub google: GoogleSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub ui: UiSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
    /// 全部服务走本地 Mock，不发网络请求
    #[serde(default)]
    pub mock_mode: bool,
    /// TUI 运行时的日志文件
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            mock_mode: false,
            log_file: default_log_file(),
        }
    }
}

fn default_app_name() -> String {
    "ForkCast".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("forkcast.log")
}

/// [openai] 段：视觉解析、查询改写、菜品介绍与语音合成
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSection {
    pub api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// 文本模型（查询改写、菜品介绍）
    #[serde(default = "default_text_model")]
    pub model: String,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    /// low / high / auto；low 可大幅节省带宽
    #[serde(default = "default_image_detail")]
    pub image_detail: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    /// 发送图片前先探测网络；未设置则跳过
    pub connectivity_probe_url: Option<String>,
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_text_model(),
            vision_model: default_vision_model(),
            image_detail: default_image_detail(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
            connectivity_probe_url: None,
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

fn default_image_detail() -> String {
    "low".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_tts_voice() -> String {
    "alloy".to_string()
}

/// [pexels] 段：菜品配图
#[derive(Debug, Clone, Deserialize)]
pub struct PexelsSection {
    pub api_key: Option<String>,
    #[serde(default = "default_pexels_base_url")]
    pub base_url: String,
    /// 追加到菜名后的固定限定词
    #[serde(default = "default_photo_qualifier")]
    pub qualifier: String,
}

impl Default for PexelsSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_pexels_base_url(),
            qualifier: default_photo_qualifier(),
        }
    }
}

fn default_pexels_base_url() -> String {
    "https://api.pexels.com/v1".to_string()
}

fn default_photo_qualifier() -> String {
    "food".to_string()
}

/// [google] 段：地点文本搜索与距离矩阵
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSection {
    pub api_key: Option<String>,
    #[serde(default = "default_google_base_url")]
    pub base_url: String,
    /// 有坐标时的搜索半径（米）
    #[serde(default = "default_search_radius")]
    pub search_radius_m: u32,
    #[serde(default = "default_travel_mode")]
    pub travel_mode: String,
    #[serde(default = "default_photo_max_width")]
    pub photo_max_width: u32,
}

impl Default for GoogleSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_google_base_url(),
            search_radius_m: default_search_radius(),
            travel_mode: default_travel_mode(),
            photo_max_width: default_photo_max_width(),
        }
    }
}

fn default_google_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_search_radius() -> u32 {
    2000
}

fn default_travel_mode() -> String {
    "driving".to_string()
}

fn default_photo_max_width() -> u32 {
    400
}

/// [pipeline] 段：推荐条数、是否改写查询、是否按距离重排
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_true")]
    pub refine_query: bool,
    #[serde(default = "default_true")]
    pub sort_by_distance: bool,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            refine_query: true,
            sort_by_distance: true,
        }
    }
}

fn default_max_results() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// [http] 段：单次请求超时（秒），0 表示不设超时
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HttpSection {
    #[serde(default)]
    pub timeout_secs: u64,
}

/// [ui] 段
#[derive(Debug, Clone, Deserialize)]
pub struct UiSection {
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "£".to_string()
}

impl AppConfig {
    /// 配置中未填写的 Key 从常用环境变量补齐（仅此一处读取进程环境）
    pub fn resolve_credentials(mut self) -> Self {
        fill_from_env(&mut self.openai.api_key, "OPENAI_API_KEY");
        fill_from_env(&mut self.pexels.api_key, "PEXELS_API_KEY");
        fill_from_env(&mut self.google.api_key, "GOOGLE_MAPS_API_KEY");
        self
    }
}

fn fill_from_env(slot: &mut Option<String>, var: &str) {
    let missing = slot.as_deref().map(str::trim).unwrap_or("").is_empty();
    if missing {
        *slot = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
    }
}

/// 从 config 目录加载配置，环境变量 FORKCAST__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 FORKCAST__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("FORKCAST")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
