use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::serde_helpers::double_option;

/// 商品分类，邻接表 + 物化路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// 始终等于 `path.len() - 1`
    pub level: usize,
    /// 从根到自身的 slug 序列
    pub path: Vec<String>,
    pub is_active: bool,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub const COLLECTION: &'static str = "categories";
}

/// 树形输出节点
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// 深度优先展开为 id 列表
    pub fn flatten_ids(&self) -> Vec<String> {
        let mut ids = vec![self.category.id.clone()];
        for child in &self.children {
            ids.extend(child.flatten_ids());
        }
        ids
    }
}

/// 分类详情：自身、祖先链（根在前）和直接子分类
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub ancestors: Vec<Category>,
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "分类名称长度必须在1-100个字符之间"))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i64>,
}

/// `parent_id` 区分三种情况：缺省（不修改）、`null`（移到根级）、具体 id
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "分类名称长度必须在1-100个字符之间"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub parent_id: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryView {
    Flat,
    Tree,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    pub view: Option<CategoryView>,
    /// 只返回该分类的直接子分类
    pub parent_id: Option<String>,
    pub root_only: Option<bool>,
    pub active_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CategoryListing {
    Flat(Vec<Category>),
    Tree(Vec<CategoryNode>),
}

impl CategoryListing {
    pub fn len(&self) -> usize {
        match self {
            CategoryListing::Flat(items) => items.len(),
            CategoryListing::Tree(nodes) => nodes.len(),
        }
    }
}

/// 删除结果：被移除的分类 id（目标在前，随后是全部后代）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCategoryResult {
    pub deleted_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_request_parent_id_states() {
        let absent: UpdateCategoryRequest = serde_json::from_value(json!({"name": "X"})).unwrap();
        assert_eq!(absent.parent_id, None);

        let to_root: UpdateCategoryRequest =
            serde_json::from_value(json!({"parentId": null})).unwrap();
        assert_eq!(to_root.parent_id, Some(None));

        let moved: UpdateCategoryRequest =
            serde_json::from_value(json!({"parentId": "cat-2"})).unwrap();
        assert_eq!(moved.parent_id, Some(Some("cat-2".to_string())));
    }

    #[test]
    fn test_category_serializes_camel_case() {
        let now = Utc::now();
        let category = Category {
            id: "cat-1".to_string(),
            name: "Cases".to_string(),
            slug: "cases".to_string(),
            description: None,
            image: None,
            parent_id: None,
            level: 0,
            path: vec!["cases".to_string()],
            is_active: true,
            order: 1,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["parentId"], json!(null));
        assert_eq!(value["isActive"], json!(true));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("description").is_none());
    }
}
