//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CHATDASH__*` 覆盖（双下划线表示嵌套，如 `CHATDASH__CHAT__STREAM_INTERVAL_MS=5`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub chat: ChatSection,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub ui: UiSection,
}

/// [app] 段：应用名、日志文件
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default)]
    pub name: Option<String>,
    /// TUI 占用终端，日志写入此文件；显式置空时写 stderr
    #[serde(default = "default_log_file")]
    pub log_file: Option<PathBuf>,
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("chatdash.log"))
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            log_file: default_log_file(),
        }
    }
}

/// [chat] 段：逐字输出节奏与事件通道容量
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSection {
    /// 每个字符之间的间隔（毫秒），20ms 约等于每秒 50 字
    #[serde(default = "default_stream_interval_ms")]
    pub stream_interval_ms: u64,
    /// ChatEvent 广播通道容量
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_stream_interval_ms() -> u64 {
    20
}

fn default_event_capacity() -> usize {
    256
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            stream_interval_ms: default_stream_interval_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ChatSection {
    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }
}

/// [agent] 段：Mock Agent 的模拟延迟区间 [min, max)
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSection {
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
}

fn default_min_latency_ms() -> u64 {
    1000
}

fn default_max_latency_ms() -> u64 {
    2000
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
        }
    }
}

/// [ui] 段：键盘轮询间隔
#[derive(Debug, Clone, Deserialize)]
pub struct UiSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 CHATDASH__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CHATDASH__*（双下划线表示嵌套键）
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
        config::Environment::with_prefix("CHATDASH")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.chat.stream_interval_ms, 20);
        assert_eq!(cfg.chat.stream_interval(), Duration::from_millis(20));
        assert_eq!(cfg.agent.min_latency_ms, 1000);
        assert_eq!(cfg.agent.max_latency_ms, 2000);
        assert_eq!(cfg.ui.poll_interval_ms, 100);
        assert_eq!(cfg.app.log_file, Some(PathBuf::from("chatdash.log")));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[chat]\nstream_interval_ms = 5\n\n[agent]\nmin_latency_ms = 10\nmax_latency_ms = 30\n"
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.chat.stream_interval_ms, 5);
        assert_eq!(cfg.chat.event_capacity, 256);
        assert_eq!(cfg.agent.min_latency_ms, 10);
        assert_eq!(cfg.agent.max_latency_ms, 30);
    }
}
