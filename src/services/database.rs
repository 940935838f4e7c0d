use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::json_store::JsonFileStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// 文档存储抽象
///
/// 每个集合是一组 JSON 文档，文档以字符串字段 `id` 作为主键。
/// 服务层只依赖这几个操作，因此既可以落到 JSON 文件，也可以用内存实现做测试。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .find_all(collection)
            .await?
            .into_iter()
            .find(|doc| doc_id(doc) == Some(id)))
    }

    async fn find_by_field(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        Ok(self
            .find_all(collection)
            .await?
            .into_iter()
            .filter(|doc| doc.get(field) == Some(value))
            .collect())
    }

    /// 插入新文档，id 已存在时返回 Conflict
    async fn insert(&self, collection: &str, doc: Value) -> Result<()>;

    /// 按 id 覆盖已有文档，不存在则追加
    async fn upsert_many(&self, collection: &str, docs: Vec<Value>) -> Result<()>;

    async fn replace_all(&self, collection: &str, docs: Vec<Value>) -> Result<()>;

    /// 返回实际删除的文档数
    async fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize>;
}

pub(crate) fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

pub(crate) fn require_id(doc: &Value) -> Result<String> {
    doc_id(doc)
        .map(str::to_string)
        .ok_or_else(|| AppError::internal("Document is missing a string id"))
}

pub(crate) fn apply_insert(docs: &mut Vec<Value>, collection: &str, doc: Value) -> Result<()> {
    let id = require_id(&doc)?;
    if docs.iter().any(|existing| doc_id(existing) == Some(id.as_str())) {
        return Err(AppError::Conflict(format!(
            "Document {} already exists in {}",
            id, collection
        )));
    }
    docs.push(doc);
    Ok(())
}

pub(crate) fn apply_upsert(docs: &mut Vec<Value>, incoming: Vec<Value>) -> Result<()> {
    for doc in incoming {
        let id = require_id(&doc)?;
        match docs.iter_mut().find(|existing| doc_id(existing) == Some(id.as_str())) {
            Some(slot) => *slot = doc,
            None => docs.push(doc),
        }
    }
    Ok(())
}

pub(crate) fn apply_delete(docs: &mut Vec<Value>, ids: &[String]) -> usize {
    let before = docs.len();
    docs.retain(|doc| match doc_id(doc) {
        Some(id) => !ids.iter().any(|target| target == id),
        None => true,
    });
    before - docs.len()
}

/// 进程内存储，用于测试和 `STORAGE_TYPE=memory`
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, doc: Value) -> Result<()> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        apply_insert(docs, collection, doc)
    }

    async fn upsert_many(&self, collection: &str, docs: Vec<Value>) -> Result<()> {
        let mut collections = self.collections.write();
        let existing = collections.entry(collection.to_string()).or_default();
        apply_upsert(existing, docs)
    }

    async fn replace_all(&self, collection: &str, docs: Vec<Value>) -> Result<()> {
        self.collections.write().insert(collection.to_string(), docs);
        Ok(())
    }

    async fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize> {
        let mut collections = self.collections.write();
        Ok(collections
            .get_mut(collection)
            .map(|docs| apply_delete(docs, ids))
            .unwrap_or(0))
    }
}

/// 数据库服务：在文档存储之上提供带类型的读写
///
/// 克隆共享同一把写锁。分类删除要检查商品引用，商品写入要检查分类存在，
/// 所以所有服务的读改写都在这一把锁下串行。
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
    writes: Arc<Mutex<()>>,
}

impl Database {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            writes: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// 根据配置选择存储后端
    pub async fn from_config(config: &Config) -> Result<Self> {
        if config.uses_memory_storage() {
            info!("Using in-memory document store");
            return Ok(Self::in_memory());
        }

        info!("Using JSON file store at {}", config.data_dir);
        let store = JsonFileStore::open(&config.data_dir).await?;
        Ok(Self::new(Arc::new(store)))
    }

    /// 验证存储可读
    pub async fn verify_connection(&self) -> Result<()> {
        self.store.find_all("categories").await?;
        info!("Document store verified successfully");
        Ok(())
    }

    /// 读改写序列的写锁，持有期间其他服务的变更操作会等待
    pub async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    /// 读取整个集合
    pub async fn select<T>(&self, collection: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.store
            .find_all(collection)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    /// 通过ID获取单个记录
    pub async fn get_by_id<T>(&self, collection: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        debug!("Fetching {}:{}", collection, id);
        match self.store.find_by_id(collection, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// 按字段等值查询
    pub async fn find_by_field<T, V>(&self, collection: &str, field: &str, value: V) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        let value = serde_json::to_value(value)?;
        self.store
            .find_by_field(collection, field, &value)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    /// 创建记录
    pub async fn create<T>(&self, collection: &str, data: T) -> Result<T>
    where
        T: Serialize,
    {
        self.store.insert(collection, serde_json::to_value(&data)?).await?;
        Ok(data)
    }

    pub async fn upsert<T>(&self, collection: &str, data: &T) -> Result<()>
    where
        T: Serialize,
    {
        self.store
            .upsert_many(collection, vec![serde_json::to_value(data)?])
            .await
    }

    pub async fn upsert_many<T>(&self, collection: &str, data: &[T]) -> Result<()>
    where
        T: Serialize,
    {
        if data.is_empty() {
            return Ok(());
        }
        let docs = data
            .iter()
            .map(|item| serde_json::to_value(item).map_err(AppError::from))
            .collect::<Result<Vec<_>>>()?;
        self.store.upsert_many(collection, docs).await
    }

    /// 通过ID删除记录，返回是否存在
    pub async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.store.delete_many(collection, &[id.to_string()]).await? > 0)
    }

    pub async fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.store.delete_many(collection, ids).await
    }
}
