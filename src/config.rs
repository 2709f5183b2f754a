use crate::error::{AppError, AppResult, ConfigError};

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 产品 CSV 输入文件路径
    pub csv_input_path: String,
    /// 输出文件目录
    pub output_dir: String,
    /// 问题历史缓存目录
    pub cache_dir: String,
    /// 每个产品的最大生成尝试次数
    pub max_attempts: usize,
    /// 处理产品数量上限（0 表示不限制）
    pub product_limit: usize,
    /// 两次尝试之间的等待毫秒数
    pub attempt_pause_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 目标语言问句格式 ---
    /// 问句起始符号
    pub question_open_mark: String,
    /// 问句结束符号
    pub question_close_mark: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_input_path: "products.csv".to_string(),
            output_dir: "output".to_string(),
            cache_dir: "faq_cache".to_string(),
            max_attempts: 3,
            product_limit: 0,
            attempt_pause_ms: 1000,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4".to_string(),
            question_open_mark: "¿".to_string(),
            question_close_mark: "?".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            csv_input_path: std::env::var("CSV_INPUT_PATH").unwrap_or(default.csv_input_path),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            cache_dir: std::env::var("CACHE_DIR").unwrap_or(default.cache_dir),
            max_attempts: std::env::var("MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_attempts),
            product_limit: std::env::var("PRODUCT_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.product_limit),
            attempt_pause_ms: std::env::var("ATTEMPT_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.attempt_pause_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            question_open_mark: std::env::var("QUESTION_OPEN_MARK").unwrap_or(default.question_open_mark),
            question_close_mark: std::env::var("QUESTION_CLOSE_MARK").unwrap_or(default.question_close_mark),
        }
    }

    /// 校验运行所需的必填配置
    pub fn validate(&self) -> AppResult<()> {
        if self.llm_api_key.is_empty() {
            return Err(AppError::Config(ConfigError::MissingValue {
                var_name: "LLM_API_KEY".to_string(),
            }));
        }
        Ok(())
    }
}
