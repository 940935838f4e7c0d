use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // Storage configuration
    pub storage_type: String,
    pub data_dir: String,

    // CORS configuration
    pub cors_allowed_origins: String,

    // Stock alerts
    /// 后台库存扫描间隔（秒），0 表示关闭
    pub alert_scan_interval: u64,
    /// 全局设置首次初始化时使用的默认值
    pub default_low_stock_threshold: i64,
    pub enable_low_stock_alerts: bool,
    pub enable_out_of_stock_alerts: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "shop_admin=debug,tower_http=debug".to_string()),

            storage_type: env::var("STORAGE_TYPE").unwrap_or_else(|_| "json".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),

            alert_scan_interval: env::var("ALERT_SCAN_INTERVAL")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
            default_low_stock_threshold: env::var("DEFAULT_LOW_STOCK_THRESHOLD")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            enable_low_stock_alerts: env::var("ENABLE_LOW_STOCK_ALERTS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()?,
            enable_out_of_stock_alerts: env::var("ENABLE_OUT_OF_STOCK_ALERTS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn uses_memory_storage(&self) -> bool {
        self.storage_type.eq_ignore_ascii_case("memory")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            environment: "development".to_string(),
            log_level: "shop_admin=debug".to_string(),
            storage_type: "memory".to_string(),
            data_dir: "./data".to_string(),
            cors_allowed_origins: "http://localhost:3001".to_string(),
            alert_scan_interval: 300,
            default_low_stock_threshold: 5,
            enable_low_stock_alerts: true,
            enable_out_of_stock_alerts: true,
        }
    }
}
