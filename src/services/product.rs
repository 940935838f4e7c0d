use crate::{
    error::{AppError, Result},
    models::category::Category,
    models::product::*,
    services::category_tree::CategoryForest,
    services::Database,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// 商品目录的最小实现：分类外键和库存字段供分类树与库存告警使用
#[derive(Clone)]
pub struct ProductService {
    db: Arc<Database>,
}

impl ProductService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn get_products(&self, query: ProductQuery) -> Result<Vec<Product>> {
        debug!("Getting products with query: {:?}", query);

        let mut products: Vec<Product> = self.db.select(Product::COLLECTION).await?;

        if let Some(category_id) = query.category.as_deref() {
            let categories: Vec<Category> = self.db.select(Category::COLLECTION).await?;
            let forest = CategoryForest::new(&categories);
            let mut scope: HashSet<String> = forest.descendant_ids(category_id).into_iter().collect();
            scope.insert(category_id.to_string());
            products.retain(|p| scope.contains(&p.category));
        }

        if let Some(search) = query.search.as_deref().map(str::to_lowercase) {
            products.retain(|p| p.name.to_lowercase().contains(&search));
        }

        if query.active_only.unwrap_or(false) {
            products.retain(|p| p.is_active);
        }

        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        self.db.get_by_id(Product::COLLECTION, id).await
    }

    async fn ensure_category_exists(&self, category_id: &str) -> Result<()> {
        let category: Option<Category> = self.db.get_by_id(Category::COLLECTION, category_id).await?;
        if category.is_none() {
            return Err(AppError::NotFound(format!("Category {} not found", category_id)));
        }
        Ok(())
    }

    pub async fn create_product(&self, request: CreateProductRequest) -> Result<Product> {
        debug!("Creating product: {}", request.name);

        request.validate().map_err(AppError::ValidatorError)?;

        // 分类检查和写入必须在同一把锁内，否则可能与分类删除交错
        let _guard = self.db.write_guard().await;
        self.ensure_category_exists(&request.category).await?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            description: request.description,
            category: request.category,
            price: request.price.unwrap_or(0.0),
            stock_quantity: request.stock_quantity,
            stock_status: derive_stock_status(
                request.stock_quantity,
                request.stock_status,
                StockStatus::InStock,
            ),
            is_active: request.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self.db.create(Product::COLLECTION, product).await?;

        info!("Created product: {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update_product(&self, id: &str, request: UpdateProductRequest) -> Result<Product> {
        debug!("Updating product: {}", id);

        request.validate().map_err(AppError::ValidatorError)?;

        let _guard = self.db.write_guard().await;
        let mut product: Product = self
            .db
            .get_by_id(Product::COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::not_found("Product"))?;

        if let Some(category) = request.category {
            if category != product.category {
                self.ensure_category_exists(&category).await?;
                product.category = category;
            }
        }
        if let Some(name) = request.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            product.description = Some(description);
        }
        if let Some(price) = request.price {
            product.price = price;
        }
        if request.untrack_stock.unwrap_or(false) {
            product.stock_quantity = None;
        } else if request.stock_quantity.is_some() {
            product.stock_quantity = request.stock_quantity;
        }
        product.stock_status = derive_stock_status(
            request.stock_quantity.and(product.stock_quantity),
            request.stock_status,
            product.stock_status,
        );
        if let Some(is_active) = request.is_active {
            product.is_active = is_active;
        }
        product.updated_at = Utc::now();

        self.db.upsert(Product::COLLECTION, &product).await?;

        info!("Updated product: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        debug!("Deleting product: {}", id);

        let _guard = self.db.write_guard().await;
        if !self.db.delete_by_id(Product::COLLECTION, id).await? {
            return Err(AppError::not_found("Product"));
        }

        info!("Deleted product: {}", id);
        Ok(())
    }
}
