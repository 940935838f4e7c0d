use crate::{
    config::Config,
    error::{AppError, Result},
    models::alert::*,
    models::product::Product,
    services::Database,
    utils::validation,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// 单个商品的库存判定结果
#[derive(Debug, Clone, PartialEq)]
pub struct StockFinding {
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub threshold: i64,
}

/// 商品级覆盖优先（仅在启用时），否则用全局阈值
pub fn resolve_threshold(override_setting: Option<&AlertSetting>, settings: &AlertSettings) -> i64 {
    match override_setting {
        Some(setting) if setting.is_enabled => setting.low_stock_threshold,
        _ => settings.global_low_stock_threshold,
    }
}

/// 判断商品是否需要告警；未跟踪库存的商品永远返回 `None`
pub fn evaluate_stock(product: &Product, threshold: i64, settings: &AlertSettings) -> Option<StockFinding> {
    let quantity = product.stock_quantity?;

    if settings.enable_out_of_stock_alerts && quantity == 0 {
        return Some(StockFinding {
            alert_type: AlertType::OutOfStock,
            priority: AlertPriority::Critical,
            threshold: 0,
        });
    }

    if settings.enable_low_stock_alerts && quantity > 0 && quantity <= threshold {
        let priority = if (quantity as f64) <= threshold as f64 / 2.0 {
            AlertPriority::High
        } else {
            AlertPriority::Medium
        };
        return Some(StockFinding {
            alert_type: AlertType::LowStock,
            priority,
            threshold,
        });
    }

    None
}

fn stock_alert(product: &Product, finding: StockFinding) -> Alert {
    let quantity = product.stock_quantity.unwrap_or(0);
    let (title, message) = match finding.alert_type {
        AlertType::OutOfStock => (
            "Out of stock".to_string(),
            format!("\"{}\" is out of stock", product.name),
        ),
        _ => (
            "Low stock".to_string(),
            format!(
                "\"{}\" is running low: {} left (threshold {})",
                product.name, quantity, finding.threshold
            ),
        ),
    };

    Alert {
        id: Uuid::new_v4().to_string(),
        alert_type: finding.alert_type,
        title,
        message,
        product_id: Some(product.id.clone()),
        product_name: Some(product.name.clone()),
        current_stock: product.stock_quantity,
        threshold: finding.threshold,
        is_read: false,
        is_dismissed: false,
        priority: finding.priority,
        created_at: Utc::now(),
    }
}

/// 优先级（critical 在前），同级按创建时间倒序
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// 库存告警引擎
#[derive(Clone)]
pub struct AlertService {
    db: Arc<Database>,
    defaults: AlertSettings,
}

impl AlertService {
    pub async fn new(db: Arc<Database>, config: &Config) -> Result<Self> {
        validation::validate_threshold(config.default_low_stock_threshold)?;

        Ok(Self {
            db,
            defaults: AlertSettings {
                id: AlertSettings::GLOBAL_ID.to_string(),
                global_low_stock_threshold: config.default_low_stock_threshold,
                enable_low_stock_alerts: config.enable_low_stock_alerts,
                enable_out_of_stock_alerts: config.enable_out_of_stock_alerts,
                updated_at: Utc::now(),
            },
        })
    }

    /// 已保存的全局设置；从未保存过时返回配置中的默认值
    pub async fn get_settings(&self) -> Result<AlertSettings> {
        let stored: Option<AlertSettings> = self
            .db
            .get_by_id(AlertSettings::COLLECTION, AlertSettings::GLOBAL_ID)
            .await?;
        Ok(stored.unwrap_or_else(|| self.defaults.clone()))
    }

    pub async fn get_settings_view(&self) -> Result<AlertSettingsView> {
        Ok(AlertSettingsView {
            global: self.get_settings().await?,
            products: self.db.select(AlertSetting::COLLECTION).await?,
        })
    }

    pub async fn update_settings(&self, request: UpdateAlertSettingsRequest) -> Result<AlertSettingsView> {
        debug!("Updating alert settings: {:?}", request);

        request.validate().map_err(AppError::ValidatorError)?;
        for item in request.product_settings.iter().flatten() {
            item.validate().map_err(AppError::ValidatorError)?;
        }

        let _guard = self.db.write_guard().await;
        let now = Utc::now();

        let mut settings = self.get_settings().await?;
        if let Some(threshold) = request.global_low_stock_threshold {
            settings.global_low_stock_threshold = threshold;
        }
        if let Some(enabled) = request.enable_low_stock_alerts {
            settings.enable_low_stock_alerts = enabled;
        }
        if let Some(enabled) = request.enable_out_of_stock_alerts {
            settings.enable_out_of_stock_alerts = enabled;
        }
        settings.updated_at = now;

        let mut upserts = Vec::new();
        let mut removals = Vec::new();

        // 同一商品出现多次时以最后一条为准
        let mut inputs: Vec<ProductAlertSettingInput> = Vec::new();
        for item in request.product_settings.unwrap_or_default() {
            inputs.retain(|i| i.product_id != item.product_id);
            inputs.push(item);
        }

        for item in inputs {
            let existing: Vec<AlertSetting> = self
                .db
                .find_by_field(AlertSetting::COLLECTION, "productId", &item.product_id)
                .await?;
            let current = existing.first();

            if item.remove.unwrap_or(false) {
                removals.extend(existing.iter().map(|s| s.id.clone()));
                continue;
            }
            removals.extend(existing.iter().skip(1).map(|s| s.id.clone()));

            let product: Option<Product> = self.db.get_by_id(Product::COLLECTION, &item.product_id).await?;
            if product.is_none() {
                return Err(AppError::NotFound(format!("Product {} not found", item.product_id)));
            }

            upserts.push(AlertSetting {
                id: current
                    .map(|s| s.id.clone())
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                product_id: item.product_id,
                low_stock_threshold: item.low_stock_threshold,
                is_enabled: item
                    .is_enabled
                    .unwrap_or_else(|| current.map(|s| s.is_enabled).unwrap_or(true)),
                updated_at: now,
            });
        }

        self.db.upsert(AlertSettings::COLLECTION, &settings).await?;
        self.db.upsert_many(AlertSetting::COLLECTION, &upserts).await?;
        self.db.delete_many(AlertSetting::COLLECTION, &removals).await?;

        info!(
            "Alert settings updated: threshold={}, low_stock={}, out_of_stock={}, {} override(s) saved, {} removed",
            settings.global_low_stock_threshold,
            settings.enable_low_stock_alerts,
            settings.enable_out_of_stock_alerts,
            upserts.len(),
            removals.len()
        );

        Ok(AlertSettingsView {
            global: settings,
            products: self.db.select(AlertSetting::COLLECTION).await?,
        })
    }

    /// 扫描全部商品并生成新告警
    ///
    /// 同一 (商品, 类型) 已有未忽略的告警时不再重复生成，因此可以反复调用。
    pub async fn check_and_generate_alerts(&self) -> Result<Vec<Alert>> {
        debug!("Running stock alert scan");

        let _guard = self.db.write_guard().await;
        let settings = self.get_settings().await?;

        if !settings.enable_low_stock_alerts && !settings.enable_out_of_stock_alerts {
            debug!("Stock alerts disabled, skipping scan");
            return Ok(Vec::new());
        }

        let products: Vec<Product> = self.db.select(Product::COLLECTION).await?;
        let overrides: Vec<AlertSetting> = self.db.select(AlertSetting::COLLECTION).await?;
        let overrides: HashMap<&str, &AlertSetting> = overrides
            .iter()
            .map(|s| (s.product_id.as_str(), s))
            .collect();

        let existing: Vec<Alert> = self.db.select(Alert::COLLECTION).await?;
        let mut live: HashSet<(String, AlertType)> = existing
            .iter()
            .filter(|a| !a.is_dismissed)
            .filter_map(|a| a.product_id.clone().map(|pid| (pid, a.alert_type)))
            .collect();

        let mut created = Vec::new();
        for product in products.iter().filter(|p| p.is_tracked()) {
            let threshold = resolve_threshold(overrides.get(product.id.as_str()).copied(), &settings);
            let Some(finding) = evaluate_stock(product, threshold, &settings) else {
                continue;
            };

            if !live.insert((product.id.clone(), finding.alert_type)) {
                continue;
            }

            created.push(stock_alert(product, finding));
        }

        self.db.upsert_many(Alert::COLLECTION, &created).await?;

        if !created.is_empty() {
            info!("Stock scan created {} alert(s)", created.len());
        }
        Ok(created)
    }

    pub async fn get_alerts(&self, query: AlertQuery) -> Result<AlertListing> {
        debug!("Getting alerts with query: {:?}", query);

        let mut alerts: Vec<Alert> = self.db.select(Alert::COLLECTION).await?;

        if !query.show_dismissed.unwrap_or(false) {
            alerts.retain(|a| !a.is_dismissed);
        }
        if let Some(alert_type) = query.alert_type {
            alerts.retain(|a| a.alert_type == alert_type);
        }
        if let Some(priority) = query.priority {
            alerts.retain(|a| a.priority == priority);
        }

        let unread_count = alerts.iter().filter(|a| a.is_unread()).count();

        if query.unread_only.unwrap_or(false) {
            alerts.retain(|a| a.is_unread());
        }

        sort_alerts(&mut alerts);
        let total = alerts.len();
        if let Some(limit) = query.limit {
            alerts.truncate(limit);
        }

        let settings = if query.include_settings.unwrap_or(false) {
            Some(self.get_settings_view().await?)
        } else {
            None
        };

        Ok(AlertListing {
            alerts,
            total,
            unread_count,
            settings,
        })
    }

    pub async fn get_unread_alerts(&self) -> Result<AlertListing> {
        self.get_alerts(AlertQuery {
            unread_only: Some(true),
            ..Default::default()
        })
        .await
    }

    pub async fn unread_count(&self) -> Result<usize> {
        let alerts: Vec<Alert> = self.db.select(Alert::COLLECTION).await?;
        Ok(alerts.iter().filter(|a| a.is_unread()).count())
    }

    async fn modify_alert<F>(&self, id: &str, change: F) -> Result<Alert>
    where
        F: FnOnce(&mut Alert),
    {
        let _guard = self.db.write_guard().await;
        let mut alert: Alert = self
            .db
            .get_by_id(Alert::COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::not_found("Alert"))?;

        change(&mut alert);
        self.db.upsert(Alert::COLLECTION, &alert).await?;
        Ok(alert)
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<Alert> {
        debug!("Marking alert {} as read", id);
        self.modify_alert(id, |alert| alert.is_read = true).await
    }

    /// 忽略告警；不影响已读状态
    pub async fn dismiss_alert(&self, id: &str) -> Result<Alert> {
        debug!("Dismissing alert {}", id);
        let alert = self.modify_alert(id, |alert| alert.is_dismissed = true).await?;
        info!("Dismissed alert {} ({:?})", alert.id, alert.alert_type);
        Ok(alert)
    }

    async fn modify_all<F>(&self, change: F) -> Result<usize>
    where
        F: Fn(&mut Alert) -> bool,
    {
        let _guard = self.db.write_guard().await;
        let alerts: Vec<Alert> = self.db.select(Alert::COLLECTION).await?;

        let changed: Vec<Alert> = alerts
            .into_iter()
            .filter_map(|mut alert| change(&mut alert).then_some(alert))
            .collect();

        self.db.upsert_many(Alert::COLLECTION, &changed).await?;
        Ok(changed.len())
    }

    /// 返回实际状态发生变化的告警数
    pub async fn mark_all_as_read(&self) -> Result<usize> {
        let count = self
            .modify_all(|alert| !std::mem::replace(&mut alert.is_read, true))
            .await?;
        info!("Marked {} alert(s) as read", count);
        Ok(count)
    }

    pub async fn dismiss_all(&self) -> Result<usize> {
        let count = self
            .modify_all(|alert| !std::mem::replace(&mut alert.is_dismissed, true))
            .await?;
        info!("Dismissed {} alert(s)", count);
        Ok(count)
    }

    pub async fn delete_alert(&self, id: &str) -> Result<()> {
        debug!("Deleting alert {}", id);

        let _guard = self.db.write_guard().await;
        if !self.db.delete_by_id(Alert::COLLECTION, id).await? {
            return Err(AppError::not_found("Alert"));
        }

        info!("Deleted alert {}", id);
        Ok(())
    }

    pub async fn create_custom_alert(&self, request: CreateCustomAlertRequest) -> Result<Alert> {
        debug!("Creating custom alert: {}", request.title);

        request.validate().map_err(AppError::ValidatorError)?;

        let product_name = match request.product_id.as_deref() {
            Some(product_id) => {
                let product: Product = self
                    .db
                    .get_by_id(Product::COLLECTION, product_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;
                Some(product.name)
            }
            None => None,
        };

        let alert = Alert {
            id: Uuid::new_v4().to_string(),
            alert_type: AlertType::Custom,
            title: request.title,
            message: request.message,
            product_id: request.product_id,
            product_name,
            current_stock: None,
            threshold: 0,
            is_read: false,
            is_dismissed: false,
            priority: request.priority.unwrap_or(AlertPriority::Medium),
            created_at: Utc::now(),
        };

        let created = self.db.create(Alert::COLLECTION, alert).await?;
        info!("Created custom alert {}", created.id);
        Ok(created)
    }
}
