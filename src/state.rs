use crate::{
    config::Config,
    error::Result,
    services::{AlertService, CategoryService, Database, ProductService},
};
use std::sync::Arc;

/// 应用程序的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 分类树服务
    pub category_service: CategoryService,

    /// 商品服务
    pub product_service: ProductService,

    /// 库存告警服务
    pub alert_service: AlertService,
}

impl AppState {
    /// 在给定存储之上初始化全部服务
    pub async fn build(config: Config, db: Arc<Database>) -> Result<Self> {
        let category_service = CategoryService::new(db.clone()).await?;
        let product_service = ProductService::new(db.clone()).await?;
        let alert_service = AlertService::new(db, &config).await?;

        Ok(Self {
            config,
            category_service,
            product_service,
            alert_service,
        })
    }
}
