use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 业务相关参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// 报销额度周期滚动检查间隔 (秒)
    #[serde(default = "default_credit_rollover_secs")]
    pub credit_rollover_secs: u64,
    /// 订阅扣费日推进检查间隔 (秒)
    #[serde(default = "default_subscription_advance_secs")]
    pub subscription_advance_secs: u64,
    /// 列表接口默认每页数量
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_credit_rollover_secs() -> u64 {
    3600
}

fn default_subscription_advance_secs() -> u64 {
    6 * 3600
}

fn default_page_size() -> u32 {
    20
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            credit_rollover_secs: default_credit_rollover_secs(),
            subscription_advance_secs: default_subscription_advance_secs(),
            default_page_size: default_page_size(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load(None)
    }

    /// 与 `from_toml` 相同, 但 database_url (命令行参数) 优先级最高;
    /// 提供时即使没有配置文件也不要求 DATABASE_URL
    pub fn load(database_url: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(Path::new(&config_path), database_url)
    }

    pub fn load_from(
        config_path: &Path,
        database_url: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 数据库 URL 在无配置文件时必须提供
                let url = database_url
                    .clone()
                    .or_else(|| get_env("DATABASE_URL"))
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;
                Self::from_env(url)
            }
            Err(e) => {
                return Err(
                    format!("Failed to read config file {}: {e}", config_path.display()).into(),
                );
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        if let Some(url) = database_url {
            config.database.url = url;
        }
        Ok(config)
    }

    fn from_env(database_url: String) -> Self {
        Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            planner: PlannerConfig::default(),
        }
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config =
            toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}"))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = get_env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get_env("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Some(v) = get_env("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = get_env("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Some(v) = get_env("PLANNER_CREDIT_ROLLOVER_SECS")
            && let Ok(n) = v.parse()
        {
            self.planner.credit_rollover_secs = n;
        }
        if let Some(v) = get_env("PLANNER_SUBSCRIPTION_ADVANCE_SECS")
            && let Ok(n) = v.parse()
        {
            self.planner.subscription_advance_secs = n;
        }
        if let Some(v) = get_env("PLANNER_DEFAULT_PAGE_SIZE")
            && let Ok(n) = v.parse()
        {
            self.planner.default_page_size = n;
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_planner_defaults() {
        let config = Config::parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "sqlite::memory:"
            max_connections = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.planner.credit_rollover_secs, 3600);
        assert_eq!(config.planner.default_page_size, 20);
    }

    #[test]
    fn test_parse_planner_section() {
        let config = Config::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/planner"
            max_connections = 10

            [planner]
            default_page_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.planner.default_page_size, 50);
        assert_eq!(config.planner.subscription_advance_secs, 6 * 3600);
    }

    #[test]
    fn test_parse_rejects_missing_database() {
        let result = Config::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_database_url_without_config_file() {
        let config = Config::load_from(
            Path::new("/nonexistent/card-planner/config.toml"),
            Some("sqlite::memory:".to_string()),
        )
        .unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
    }

    #[test]
    fn test_cli_database_url_overrides_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nhost = \"127.0.0.1\"\nport = 9000\n\n[database]\nurl = \"postgres://localhost/planner\"\nmax_connections = 5"
        )
        .unwrap();

        let config =
            Config::load_from(file.path(), Some("sqlite://import.db".to_string())).unwrap();
        assert_eq!(config.database.url, "sqlite://import.db");
    }
}
