use crate::{
    error::{AppError, Result},
    models::category::*,
    models::product::Product,
    services::category_tree::{prune_inactive, rematerialize_descendants, CategoryForest},
    services::Database,
    utils::{slug, validation},
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// 分类树管理
///
/// 每次变更都是 "读全集合 → 内存校验/计算 → 一次性写回"，
/// 全程持有 `Database::write_guard`。
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<Database>,
}

impl CategoryService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    async fn load_all(&self) -> Result<Vec<Category>> {
        self.db.select(Category::COLLECTION).await
    }

    pub async fn list_categories(&self, query: CategoryQuery) -> Result<CategoryListing> {
        debug!("Listing categories with query: {:?}", query);

        let all = self.load_all().await?;
        let forest = CategoryForest::new(&all);
        let active_only = query.active_only.unwrap_or(false);

        if let Some(parent_id) = query.parent_id.as_deref() {
            let children = forest
                .children(Some(parent_id))
                .into_iter()
                .filter(|c| !active_only || c.is_active)
                .cloned()
                .collect();
            return Ok(CategoryListing::Flat(children));
        }

        if query.root_only.unwrap_or(false) {
            let roots = forest
                .children(None)
                .into_iter()
                .filter(|c| !active_only || c.is_active)
                .cloned()
                .collect();
            return Ok(CategoryListing::Flat(roots));
        }

        if query.view == Some(CategoryView::Tree) {
            let tree = forest.build_tree();
            let tree = if active_only { prune_inactive(tree) } else { tree };
            return Ok(CategoryListing::Tree(tree));
        }

        let mut flat: Vec<Category> = all
            .iter()
            .filter(|c| {
                !active_only
                    || (c.is_active && forest.ancestors(&c.id).iter().all(|a| a.is_active))
            })
            .cloned()
            .collect();
        flat.sort_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then(a.order.cmp(&b.order))
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(CategoryListing::Flat(flat))
    }

    pub async fn get_category(&self, id: &str) -> Result<Option<Category>> {
        self.db.get_by_id(Category::COLLECTION, id).await
    }

    /// 分类详情，附带祖先链和直接子分类
    pub async fn get_category_detail(&self, id: &str) -> Result<Option<CategoryDetail>> {
        let all = self.load_all().await?;
        let forest = CategoryForest::new(&all);

        Ok(forest.get(id).map(|category| CategoryDetail {
            category: category.clone(),
            ancestors: forest.ancestors(id).into_iter().cloned().collect(),
            children: forest.children(Some(id)).into_iter().cloned().collect(),
        }))
    }

    pub async fn get_children(&self, parent_id: Option<&str>) -> Result<Vec<Category>> {
        let all = self.load_all().await?;
        let forest = CategoryForest::new(&all);
        Ok(forest.children(parent_id).into_iter().cloned().collect())
    }

    pub async fn get_descendants(&self, id: &str) -> Result<Vec<Category>> {
        let all = self.load_all().await?;
        let forest = CategoryForest::new(&all);
        Ok(forest.descendants(id).into_iter().cloned().collect())
    }

    pub async fn get_ancestors(&self, id: &str) -> Result<Vec<Category>> {
        let all = self.load_all().await?;
        let forest = CategoryForest::new(&all);
        Ok(forest.ancestors(id).into_iter().cloned().collect())
    }

    pub async fn build_tree(&self) -> Result<Vec<CategoryNode>> {
        let all = self.load_all().await?;
        Ok(CategoryForest::new(&all).build_tree())
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> Result<Category> {
        debug!("Creating category: {}", request.name);

        request.validate().map_err(AppError::ValidatorError)?;
        validation::validate_category_name(&request.name)?;

        let _guard = self.db.write_guard().await;
        let all = self.load_all().await?;
        let forest = CategoryForest::new(&all);

        let parent = match request.parent_id.as_deref().filter(|p| !p.is_empty()) {
            Some(parent_id) => Some(forest.get(parent_id).ok_or_else(|| {
                AppError::NotFound(format!("Parent category {} not found", parent_id))
            })?),
            None => None,
        };

        let siblings = forest.children(parent.map(|p| p.id.as_str()));
        let sibling_slugs: Vec<&str> = siblings.iter().map(|c| c.slug.as_str()).collect();

        let slug = match request.slug.as_deref() {
            Some(explicit) => {
                let explicit = validation::validate_category_slug(explicit)?;
                if sibling_slugs.contains(&explicit.as_str()) {
                    return Err(AppError::Conflict(format!(
                        "Category slug '{}' already exists at this level",
                        explicit
                    )));
                }
                explicit
            }
            None => {
                let base = slug::generate_slug(&request.name);
                if base.is_empty() {
                    return Err(AppError::validation("无法从分类名称生成 slug，请手动指定"));
                }
                slug::make_slug_unique(&base, &sibling_slugs)
            }
        };

        let mut path = parent.map(|p| p.path.clone()).unwrap_or_default();
        path.push(slug.clone());

        let order = request.order.unwrap_or_else(|| {
            siblings
                .iter()
                .map(|c| c.order)
                .max()
                .map(|max| max + 1)
                .unwrap_or(1)
        });

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            slug,
            description: request.description,
            image: request.image,
            parent_id: parent.map(|p| p.id.clone()),
            level: path.len() - 1,
            path,
            is_active: request.is_active.unwrap_or(true),
            order,
            created_at: now,
            updated_at: now,
        };

        let created = self.db.create(Category::COLLECTION, category).await?;

        info!("Created category: {} ({}) at /{}", created.name, created.id, created.path.join("/"));
        Ok(created)
    }

    pub async fn update_category(&self, id: &str, request: UpdateCategoryRequest) -> Result<Category> {
        debug!("Updating category: {}", id);

        request.validate().map_err(AppError::ValidatorError)?;
        if let Some(name) = &request.name {
            validation::validate_category_name(name)?;
        }
        let new_slug = request
            .slug
            .as_deref()
            .map(validation::validate_category_slug)
            .transpose()?;

        let _guard = self.db.write_guard().await;
        let mut all = self.load_all().await?;
        let now = Utc::now();

        let (updated, structure_changed) = {
            let forest = CategoryForest::new(&all);
            let current = forest
                .get(id)
                .ok_or_else(|| AppError::not_found("Category"))?;

            let slug = new_slug.unwrap_or_else(|| current.slug.clone());
            let slug_changed = slug != current.slug;

            // 空字符串视同 null
            let requested_parent = request
                .parent_id
                .clone()
                .map(|p| p.filter(|pid| !pid.is_empty()));
            let parent_changed = match &requested_parent {
                Some(new_parent) => new_parent.as_deref() != current.parent_id.as_deref(),
                None => false,
            };

            let mut updated = current.clone();

            if parent_changed {
                match requested_parent.flatten() {
                    Some(parent_id) => {
                        if forest.would_create_cycle(id, &parent_id) {
                            return Err(AppError::InvalidOperation(format!(
                                "Cannot move category {} under itself or one of its descendants",
                                id
                            )));
                        }
                        let parent = forest.get(&parent_id).ok_or_else(|| {
                            AppError::NotFound(format!("Parent category {} not found", parent_id))
                        })?;
                        let mut path = parent.path.clone();
                        path.push(slug.clone());
                        updated.path = path;
                        updated.parent_id = Some(parent_id);
                    }
                    None => {
                        updated.path = vec![slug.clone()];
                        updated.parent_id = None;
                    }
                }
            } else if slug_changed {
                updated.path.pop();
                updated.path.push(slug.clone());
            }

            if parent_changed || slug_changed {
                let clash = forest
                    .children(updated.parent_id.as_deref())
                    .iter()
                    .any(|c| c.id != id && c.slug == slug);
                if clash {
                    return Err(AppError::Conflict(format!(
                        "Category slug '{}' already exists at this level",
                        slug
                    )));
                }
            }

            updated.slug = slug;
            updated.level = updated.path.len().saturating_sub(1);

            if let Some(name) = request.name {
                updated.name = name.trim().to_string();
            }
            if let Some(description) = request.description {
                updated.description = Some(description);
            }
            if let Some(image) = request.image {
                updated.image = Some(image);
            }
            if let Some(is_active) = request.is_active {
                updated.is_active = is_active;
            }
            if let Some(order) = request.order {
                updated.order = order;
            }
            updated.updated_at = now;

            (updated, parent_changed || slug_changed)
        };

        let mut to_write = vec![updated.clone()];

        if structure_changed {
            if let Some(slot) = all.iter_mut().find(|c| c.id == id) {
                *slot = updated.clone();
            }
            let changed_ids: HashSet<String> = rematerialize_descendants(&mut all, id, now)
                .into_iter()
                .collect();
            to_write.extend(all.into_iter().filter(|c| changed_ids.contains(&c.id)));
            debug!("Re-materialized {} descendant path(s) of {}", changed_ids.len(), id);
        }

        self.db.upsert_many(Category::COLLECTION, &to_write).await?;

        info!("Updated category: {} ({})", updated.name, updated.id);
        Ok(updated)
    }

    /// 删除分类及其全部后代
    ///
    /// 只要有商品引用了其中任一分类就整体拒绝，不做部分删除。
    pub async fn delete_category(&self, id: &str) -> Result<DeleteCategoryResult> {
        debug!("Deleting category: {}", id);

        let _guard = self.db.write_guard().await;
        let all = self.load_all().await?;
        let forest = CategoryForest::new(&all);

        if !forest.contains(id) {
            return Err(AppError::not_found("Category"));
        }

        let mut ids = vec![id.to_string()];
        ids.extend(forest.descendant_ids(id));
        let id_set: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let products: Vec<Product> = self.db.select(Product::COLLECTION).await?;
        let blocking: Vec<Product> = products
            .into_iter()
            .filter(|p| id_set.contains(p.category.as_str()))
            .collect();

        if !blocking.is_empty() {
            return Err(AppError::CategoryInUse {
                category_id: id.to_string(),
                products: blocking,
            });
        }

        let removed = self.db.delete_many(Category::COLLECTION, &ids).await?;

        info!("Deleted category {} and {} descendant(s)", id, removed.saturating_sub(1));
        Ok(DeleteCategoryResult { deleted_ids: ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::StockStatus;
    use crate::services::json_store::JsonFileStore;

    async fn service() -> (CategoryService, Arc<Database>) {
        let db = Arc::new(Database::in_memory());
        let service = CategoryService::new(db.clone()).await.unwrap();
        (service, db)
    }

    fn create(name: &str, parent_id: Option<&str>) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
            ..Default::default()
        }
    }

    async fn add_product(db: &Database, id: &str, category: &str) {
        let now = Utc::now();
        db.create(
            Product::COLLECTION,
            Product {
                id: id.to_string(),
                name: format!("Product {}", id),
                description: None,
                category: category.to_string(),
                price: 9.99,
                stock_quantity: Some(10),
                stock_status: StockStatus::InStock,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .unwrap();
    }

    /// 每个分类都满足 level/path 不变式，且 path 前缀等于父分类 path
    async fn assert_invariants(service: &CategoryService) {
        let all = service.load_all().await.unwrap();
        let forest = CategoryForest::new(&all);
        for c in &all {
            assert_eq!(c.level, c.path.len() - 1, "level mismatch for {}", c.id);
            assert_eq!(c.path.last(), Some(&c.slug));
            if let Some(parent_id) = &c.parent_id {
                let parent = forest.get(parent_id).expect("parent exists");
                assert_eq!(&c.path[..c.path.len() - 1], &parent.path[..]);
            }
        }
    }

    #[tokio::test]
    async fn test_create_child_and_rename_root() {
        let (service, _) = service().await;
        let chargers = service.create_category(create("Chargers", None)).await.unwrap();
        assert_eq!(chargers.path, vec!["chargers"]);
        assert_eq!(chargers.level, 0);

        let fast = service
            .create_category(create("Fast Chargers", Some(&chargers.id)))
            .await
            .unwrap();
        assert_eq!(fast.slug, "fast-chargers");
        assert_eq!(fast.path, vec!["chargers", "fast-chargers"]);
        assert_eq!(fast.level, 1);

        service
            .update_category(
                &chargers.id,
                UpdateCategoryRequest {
                    slug: Some("power".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let fast = service.get_category(&fast.id).await.unwrap().unwrap();
        assert_eq!(fast.path, vec!["power", "fast-chargers"]);
        assert_invariants(&service).await;
    }

    #[tokio::test]
    async fn test_create_with_missing_parent_fails() {
        let (service, _) = service().await;
        let err = service
            .create_category(create("Orphan", Some("does-not-exist")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(service.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (service, _) = service().await;
        for name in ["", "   "] {
            let err = service.create_category(create(name, None)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_) | AppError::ValidatorError(_)));
        }
    }

    #[tokio::test]
    async fn test_order_defaults_to_next_sibling() {
        let (service, _) = service().await;
        let first = service.create_category(create("Cases", None)).await.unwrap();
        assert_eq!(first.order, 1);

        let explicit = service
            .create_category(CreateCategoryRequest {
                order: Some(10),
                ..create("Cables", None)
            })
            .await
            .unwrap();
        assert_eq!(explicit.order, 10);

        let next = service.create_category(create("Audio", None)).await.unwrap();
        assert_eq!(next.order, 11);

        let child = service
            .create_category(create("Leather", Some(&first.id)))
            .await
            .unwrap();
        assert_eq!(child.order, 1);
    }

    #[tokio::test]
    async fn test_slug_uniqueness_among_siblings() {
        let (service, _) = service().await;
        let cables = service.create_category(create("Cables", None)).await.unwrap();
        let again = service.create_category(create("Cables", None)).await.unwrap();
        assert_eq!(again.slug, "cables-2");

        let err = service
            .create_category(CreateCategoryRequest {
                slug: Some("cables".to_string()),
                ..create("Other Cables", None)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // 不同父级下允许同名 slug
        let nested = service
            .create_category(create("Cables", Some(&cables.id)))
            .await
            .unwrap();
        assert_eq!(nested.slug, "cables");
    }

    #[tokio::test]
    async fn test_reparent_under_descendant_is_rejected() {
        let (service, _) = service().await;
        let root = service.create_category(create("Audio", None)).await.unwrap();
        let child = service
            .create_category(create("Headphones", Some(&root.id)))
            .await
            .unwrap();
        let grandchild = service
            .create_category(create("Wireless", Some(&child.id)))
            .await
            .unwrap();

        let before = service.load_all().await.unwrap();

        for target in [&grandchild.id, &root.id] {
            let err = service
                .update_category(
                    &root.id,
                    UpdateCategoryRequest {
                        parent_id: Some(Some(target.clone())),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidOperation(_)));
        }

        assert_eq!(service.load_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_reparent_moves_subtree() {
        let (service, _) = service().await;
        let audio = service.create_category(create("Audio", None)).await.unwrap();
        let chargers = service.create_category(create("Chargers", None)).await.unwrap();
        let wireless = service
            .create_category(create("Wireless", Some(&audio.id)))
            .await
            .unwrap();
        let pads = service
            .create_category(create("Pads", Some(&wireless.id)))
            .await
            .unwrap();

        let moved = service
            .update_category(
                &wireless.id,
                UpdateCategoryRequest {
                    parent_id: Some(Some(chargers.id.clone())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.path, vec!["chargers", "wireless"]);
        assert_eq!(moved.level, 1);

        let pads = service.get_category(&pads.id).await.unwrap().unwrap();
        assert_eq!(pads.path, vec!["chargers", "wireless", "pads"]);
        assert_eq!(pads.level, 2);

        let to_root = service
            .update_category(
                &wireless.id,
                UpdateCategoryRequest {
                    parent_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(to_root.path, vec!["wireless"]);
        assert_eq!(to_root.level, 0);
        assert!(to_root.parent_id.is_none());

        let pads = service.get_category(&pads.id).await.unwrap().unwrap();
        assert_eq!(pads.path, vec!["wireless", "pads"]);
        assert_eq!(pads.level, 1);
        assert_invariants(&service).await;
    }

    #[tokio::test]
    async fn test_reparent_to_missing_parent_fails() {
        let (service, _) = service().await;
        let audio = service.create_category(create("Audio", None)).await.unwrap();
        let err = service
            .update_category(
                &audio.id,
                UpdateCategoryRequest {
                    parent_id: Some(Some("missing".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let (service, _) = service().await;
        let err = service
            .update_category("missing", UpdateCategoryRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_plain_field_update_keeps_path() {
        let (service, _) = service().await;
        let audio = service.create_category(create("Audio", None)).await.unwrap();
        let updated = service
            .update_category(
                &audio.id,
                UpdateCategoryRequest {
                    name: Some("Audio & Sound".to_string()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Audio & Sound");
        assert_eq!(updated.slug, "audio");
        assert_eq!(updated.path, vec!["audio"]);
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_subtree() {
        let (service, _) = service().await;
        let audio = service.create_category(create("Audio", None)).await.unwrap();
        let cases = service.create_category(create("Cases", None)).await.unwrap();
        let child = service
            .create_category(create("Headphones", Some(&audio.id)))
            .await
            .unwrap();
        let grandchild = service
            .create_category(create("Wireless", Some(&child.id)))
            .await
            .unwrap();
        let sibling_leaf = service
            .create_category(create("Leather", Some(&cases.id)))
            .await
            .unwrap();

        let result = service.delete_category(&audio.id).await.unwrap();
        let mut deleted = result.deleted_ids.clone();
        deleted.sort();
        let mut expected = vec![audio.id.clone(), child.id.clone(), grandchild.id.clone()];
        expected.sort();
        assert_eq!(deleted, expected);

        let mut remaining: Vec<String> = service
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        remaining.sort();
        let mut expected_remaining = vec![cases.id.clone(), sibling_leaf.id.clone()];
        expected_remaining.sort();
        assert_eq!(remaining, expected_remaining);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_product_in_descendant() {
        let (service, db) = service().await;
        let audio = service.create_category(create("Audio", None)).await.unwrap();
        let child = service
            .create_category(create("Headphones", Some(&audio.id)))
            .await
            .unwrap();
        add_product(&db, "p-1", &child.id).await;

        let err = service.delete_category(&audio.id).await.unwrap_err();
        match err {
            AppError::CategoryInUse { category_id, products } => {
                assert_eq!(category_id, audio.id);
                assert_eq!(products.len(), 1);
                assert_eq!(products[0].id, "p-1");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(service.load_all().await.unwrap().len(), 2);

        // 商品只挂在子分类上时，删除兄弟分类不受影响
        let other = service.create_category(create("Cables", None)).await.unwrap();
        assert!(service.delete_category(&other.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_category() {
        let (service, _) = service().await;
        let err = service.delete_category("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_modes() {
        let (service, _) = service().await;
        let audio = service.create_category(create("Audio", None)).await.unwrap();
        let cases = service.create_category(create("Cases", None)).await.unwrap();
        let headphones = service
            .create_category(create("Headphones", Some(&audio.id)))
            .await
            .unwrap();
        service
            .create_category(create("Speakers", Some(&audio.id)))
            .await
            .unwrap();
        service
            .update_category(
                &cases.id,
                UpdateCategoryRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let flat = service.list_categories(CategoryQuery::default()).await.unwrap();
        match flat {
            CategoryListing::Flat(items) => {
                assert_eq!(items.len(), 4);
                assert_eq!(items[0].id, audio.id);
                assert_eq!(items[2].id, headphones.id);
            }
            _ => panic!("expected flat listing"),
        }

        let roots = service
            .list_categories(CategoryQuery {
                root_only: Some(true),
                active_only: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(roots.len(), 1);

        let children = service
            .list_categories(CategoryQuery {
                parent_id: Some(audio.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(children.len(), 2);

        let tree = service
            .list_categories(CategoryQuery {
                view: Some(CategoryView::Tree),
                ..Default::default()
            })
            .await
            .unwrap();
        match tree {
            CategoryListing::Tree(nodes) => {
                let count: usize = nodes.iter().map(|n| n.flatten_ids().len()).sum();
                assert_eq!(count, 4);
                assert_eq!(nodes[0].children.len(), 2);
            }
            _ => panic!("expected tree listing"),
        }
    }

    #[tokio::test]
    async fn test_detail_and_traversal() {
        let (service, _) = service().await;
        let audio = service.create_category(create("Audio", None)).await.unwrap();
        let child = service
            .create_category(create("Headphones", Some(&audio.id)))
            .await
            .unwrap();
        let grandchild = service
            .create_category(create("Wireless", Some(&child.id)))
            .await
            .unwrap();

        let detail = service.get_category_detail(&child.id).await.unwrap().unwrap();
        assert_eq!(detail.ancestors.len(), 1);
        assert_eq!(detail.ancestors[0].id, audio.id);
        assert_eq!(detail.children.len(), 1);
        assert_eq!(detail.children[0].id, grandchild.id);

        let ancestors = service.get_ancestors(&grandchild.id).await.unwrap();
        let ancestor_ids: Vec<String> = ancestors.into_iter().map(|c| c.id).collect();
        assert_eq!(ancestor_ids, vec![audio.id.clone(), child.id.clone()]);

        assert_eq!(service.get_descendants(&audio.id).await.unwrap().len(), 2);
        assert_eq!(service.get_children(None).await.unwrap().len(), 1);
        assert_eq!(service.build_tree().await.unwrap().len(), 1);

        assert!(service.get_category_detail("missing").await.unwrap().is_none());
        assert!(service.get_descendants("missing").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_orders() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::new(Arc::new(JsonFileStore::open(dir.path()).await.unwrap())));
        let service = CategoryService::new(db).await.unwrap();

        let creates: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.create_category(create(&format!("Line {}", i), None)).await })
            })
            .collect();

        let mut orders = Vec::new();
        for handle in creates {
            orders.push(handle.await.unwrap().unwrap().order);
        }
        orders.sort();
        assert_eq!(orders, (1..=8).collect::<Vec<i64>>());
        assert_eq!(service.load_all().await.unwrap().len(), 8);
    }
}
