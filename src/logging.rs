// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 输出固定写 stderr: stdout 留给 JSON 行 / CSV 结果
// 格式由 CEMMIND_LOG_FORMAT 选择 (text | json)
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "CEMMIND_LOG_FORMAT";

// 未设置 RUST_LOG 时的过滤器: 本 crate 输出 info, 依赖库只输出 warn
const DEFAULT_FILTER: &str = "warn,cemmind=info,seed_history=info";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 人读文本 (默认)
    #[default]
    Text,
    /// 每条事件一行 JSON, 便于采集
    Json,
}

impl LogFormat {
    /// 解析格式名, 未知值回落到 Text
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    /// 从 CEMMIND_LOG_FORMAT 读取
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: warn,cemmind=info）
/// - CEMMIND_LOG_FORMAT: text 或 json
///
/// # 示例
/// ```no_run
/// use cemmind::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with_format(LogFormat::from_env());
}

/// 按指定格式初始化 (重复调用时静默忽略)
pub fn init_with_format(format: LogFormat) {
    let builder = fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };

    if let Err(e) = result {
        eprintln!("日志系统已初始化, 跳过: {}", e);
    }
}

/// 初始化测试环境的日志系统
///
/// 输出交给测试框架捕获; 多个测试重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("cemmind=debug"))
        .with_test_writer()
        .try_init();
}
