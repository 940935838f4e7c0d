use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    ComingSoon,
}

impl Default for StockStatus {
    fn default() -> Self {
        StockStatus::InStock
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 所属分类 id
    pub category: String,
    #[serde(default)]
    pub price: f64,
    /// `None` 表示不跟踪库存
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub const COLLECTION: &'static str = "products";

    pub fn is_tracked(&self) -> bool {
        self.stock_quantity.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "商品名称长度必须在1-200个字符之间"))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "库存数量不能为负数"))]
    pub stock_quantity: Option<i64>,
    pub stock_status: Option<StockStatus>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "商品名称长度必须在1-200个字符之间"))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "库存数量不能为负数"))]
    pub stock_quantity: Option<i64>,
    /// 置为 true 时停止跟踪库存（`stock_quantity` 变为 null）
    pub untrack_stock: Option<bool>,
    pub stock_status: Option<StockStatus>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// 按分类过滤，包含其全部子分类
    pub category: Option<String>,
    pub search: Option<String>,
    pub active_only: Option<bool>,
}

/// 库存数量归零时自动切换为缺货，其余情况沿用给定或原有状态
pub fn derive_stock_status(
    quantity: Option<i64>,
    requested: Option<StockStatus>,
    current: StockStatus,
) -> StockStatus {
    if let Some(status) = requested {
        return status;
    }
    match quantity {
        Some(0) => StockStatus::OutOfStock,
        Some(_) if current == StockStatus::OutOfStock => StockStatus::InStock,
        _ => current,
    }
}
