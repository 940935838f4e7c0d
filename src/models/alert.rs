use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    ExpiringAnnouncement,
    Custom,
}

/// 声明顺序即排序顺序：critical 最靠前
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl AlertPriority {
    pub fn rank(self) -> u8 {
        match self {
            AlertPriority::Critical => 0,
            AlertPriority::High => 1,
            AlertPriority::Medium => 2,
            AlertPriority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<i64>,
    /// 生成告警时使用的阈值
    pub threshold: i64,
    pub is_read: bool,
    pub is_dismissed: bool,
    pub priority: AlertPriority,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub const COLLECTION: &'static str = "alerts";

    pub fn is_unread(&self) -> bool {
        !self.is_read && !self.is_dismissed
    }
}

/// 全局告警设置，持久化为单个文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSettings {
    pub id: String,
    pub global_low_stock_threshold: i64,
    pub enable_low_stock_alerts: bool,
    pub enable_out_of_stock_alerts: bool,
    pub updated_at: DateTime<Utc>,
}

impl AlertSettings {
    pub const COLLECTION: &'static str = "alert_settings";
    pub const GLOBAL_ID: &'static str = "global";
}

/// 单个商品的阈值覆盖
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSetting {
    pub id: String,
    pub product_id: String,
    pub low_stock_threshold: i64,
    pub is_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl AlertSetting {
    pub const COLLECTION: &'static str = "product_alert_settings";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSettingsView {
    pub global: AlertSettings,
    pub products: Vec<AlertSetting>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductAlertSettingInput {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 0, message = "阈值不能为负数"))]
    pub low_stock_threshold: i64,
    pub is_enabled: Option<bool>,
    /// 为 true 时删除该商品的覆盖设置
    pub remove: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertSettingsRequest {
    #[validate(range(min = 0, message = "阈值不能为负数"))]
    pub global_low_stock_threshold: Option<i64>,
    pub enable_low_stock_alerts: Option<bool>,
    pub enable_out_of_stock_alerts: Option<bool>,
    pub product_settings: Option<Vec<ProductAlertSettingInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomAlertRequest {
    #[validate(length(min = 1, max = 200, message = "标题长度必须在1-200个字符之间"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    pub priority: Option<AlertPriority>,
    pub product_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub unread_only: Option<bool>,
    pub show_dismissed: Option<bool>,
    pub include_settings: Option<bool>,
    #[serde(rename = "type")]
    pub alert_type: Option<AlertType>,
    pub priority: Option<AlertPriority>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertListing {
    pub alerts: Vec<Alert>,
    pub total: usize,
    pub unread_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<AlertSettingsView>,
}
