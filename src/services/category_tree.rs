//! 分类森林上的纯查询与路径重算
//!
//! 所有遍历都带 visited 集合：父指针只由分类服务写入，正常情况下不会成环，
//! 但外部导入的数据可能有问题，遍历必须在环上终止。

use crate::models::category::{Category, CategoryNode};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// 对一份扁平分类列表建立的只读索引
pub struct CategoryForest<'a> {
    all: &'a [Category],
    by_id: HashMap<&'a str, &'a Category>,
    roots: Vec<&'a Category>,
    children: HashMap<&'a str, Vec<&'a Category>>,
}

impl<'a> CategoryForest<'a> {
    pub fn new(all: &'a [Category]) -> Self {
        let mut by_id = HashMap::with_capacity(all.len());
        let mut roots: Vec<&'a Category> = Vec::new();
        let mut children: HashMap<&'a str, Vec<&'a Category>> = HashMap::new();

        for category in all {
            by_id.insert(category.id.as_str(), category);
            match category.parent_id.as_deref() {
                Some(parent_id) => children.entry(parent_id).or_default().push(category),
                None => roots.push(category),
            }
        }

        roots.sort_by_key(|c| c.order);
        for siblings in children.values_mut() {
            siblings.sort_by_key(|c| c.order);
        }

        Self {
            all,
            by_id,
            roots,
            children,
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Category> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// 直接子分类，按 `order` 升序；`None` 表示根级
    pub fn children(&self, parent_id: Option<&str>) -> Vec<&'a Category> {
        match parent_id {
            Some(id) => self.children.get(id).cloned().unwrap_or_default(),
            None => self.roots.clone(),
        }
    }

    /// 全部后代（深度优先、先序），不包含自身
    pub fn descendants(&self, id: &str) -> Vec<&'a Category> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);

        let mut stack: Vec<&'a Category> = self.children(Some(id));
        stack.reverse();

        while let Some(category) = stack.pop() {
            if !visited.insert(category.id.as_str()) {
                warn!("Cycle detected below category {} at {}", id, category.id);
                continue;
            }
            result.push(category);
            let mut next = self.children(Some(category.id.as_str()));
            next.reverse();
            stack.extend(next);
        }

        result
    }

    pub fn descendant_ids(&self, id: &str) -> Vec<String> {
        self.descendants(id).into_iter().map(|c| c.id.clone()).collect()
    }

    /// 祖先链，根在前，不包含自身；id 不存在时为空
    pub fn ancestors(&self, id: &str) -> Vec<&'a Category> {
        let mut chain = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);

        let mut current = self.get(id).and_then(|c| c.parent_id.as_deref());
        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                warn!("Cycle detected in ancestors of category {}", id);
                break;
            }
            match self.get(parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent.parent_id.as_deref();
                }
                None => break,
            }
        }

        chain.reverse();
        chain
    }

    /// 把 `id` 挂到 `new_parent_id` 下是否会成环
    pub fn would_create_cycle(&self, id: &str, new_parent_id: &str) -> bool {
        id == new_parent_id
            || self
                .descendants(id)
                .iter()
                .any(|c| c.id == new_parent_id)
    }

    /// 构建森林，每一层都按 `order` 排序
    ///
    /// 父分类不存在的孤儿节点当作根；环上的节点从首个未访问成员处断开，
    /// 保证每个分类恰好出现一次。
    pub fn build_tree(&self) -> Vec<CategoryNode> {
        let mut visited: HashSet<&str> = HashSet::new();

        let mut roots: Vec<&'a Category> = self
            .all
            .iter()
            .filter(|c| match c.parent_id.as_deref() {
                None => true,
                Some(parent_id) => !self.contains(parent_id),
            })
            .collect();
        roots.sort_by_key(|c| c.order);

        let mut forest: Vec<CategoryNode> = roots
            .into_iter()
            .filter_map(|root| self.build_node(root, &mut visited))
            .collect();

        for category in self.all {
            if !visited.contains(category.id.as_str()) {
                warn!("Category {} is unreachable from any root, emitting as root", category.id);
                if let Some(node) = self.build_node(category, &mut visited) {
                    forest.push(node);
                }
            }
        }

        forest
    }

    fn build_node(&self, category: &'a Category, visited: &mut HashSet<&'a str>) -> Option<CategoryNode> {
        if !visited.insert(category.id.as_str()) {
            return None;
        }

        let children = self
            .children(Some(category.id.as_str()))
            .into_iter()
            .filter_map(|child| self.build_node(child, visited))
            .collect();

        Some(CategoryNode {
            category: category.clone(),
            children,
        })
    }
}

/// 只保留启用的分类；停用的分类连同其整棵子树一起隐藏
pub fn prune_inactive(nodes: Vec<CategoryNode>) -> Vec<CategoryNode> {
    nodes
        .into_iter()
        .filter(|node| node.category.is_active)
        .map(|node| CategoryNode {
            children: prune_inactive(node.children),
            category: node.category,
        })
        .collect()
}

/// 以 `root_id` 当前的 path 为前缀，重新物化全部后代的 path/level
///
/// 用显式栈遍历，返回 path 或 level 实际发生变化的分类 id。
pub fn rematerialize_descendants(
    categories: &mut [Category],
    root_id: &str,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    let mut root_path = None;
    for (i, category) in categories.iter().enumerate() {
        if let Some(parent_id) = &category.parent_id {
            index.entry(parent_id.clone()).or_default().push(i);
        }
        if category.id == root_id {
            root_path = Some(category.path.clone());
        }
    }

    let Some(root_path) = root_path else {
        return Vec::new();
    };

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(root_id.to_string());
    let mut stack = vec![(root_id.to_string(), root_path)];
    let mut changed = Vec::new();

    while let Some((parent_id, parent_path)) = stack.pop() {
        let Some(child_indices) = index.get(&parent_id) else {
            continue;
        };

        for &i in child_indices {
            let child = &mut categories[i];
            if !visited.insert(child.id.clone()) {
                warn!("Cycle detected while updating paths below {}", root_id);
                continue;
            }

            let mut path = parent_path.clone();
            path.push(child.slug.clone());
            let level = path.len() - 1;

            if child.path != path || child.level != level {
                child.path = path.clone();
                child.level = level;
                child.updated_at = now;
                changed.push(child.id.clone());
            }

            stack.push((child.id.clone(), path));
        }
    }

    changed
}
