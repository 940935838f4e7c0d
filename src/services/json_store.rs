use crate::error::{AppError, Result};
use crate::services::database::{apply_delete, apply_insert, apply_upsert, DocumentStore};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// 基于 JSON 文件的文档存储
///
/// 每个集合对应 `<data_dir>/<collection>.json`，内容是文档数组。
/// 写入先落到临时文件再 rename，整段读改写在同一把锁内完成。
pub struct JsonFileStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        info!("JSON store ready at {}", root.display());
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        if collection.is_empty()
            || !collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::internal("Invalid collection name"));
        }
        Ok(self.root.join(format!("{}.json", collection)))
    }

    async fn read_collection(&self, collection: &str) -> Result<Vec<Value>> {
        let path = self.collection_path(collection)?;
        match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_collection(&self, collection: &str, docs: &[Value]) -> Result<()> {
        let path = self.collection_path(collection)?;
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(docs)?;
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;
        debug!("Wrote {} documents to {}", docs.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        let _guard = self.lock.lock().await;
        self.read_collection(collection).await
    }

    async fn insert(&self, collection: &str, doc: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut docs = self.read_collection(collection).await?;
        apply_insert(&mut docs, collection, doc)?;
        self.write_collection(collection, &docs).await
    }

    async fn upsert_many(&self, collection: &str, incoming: Vec<Value>) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut docs = self.read_collection(collection).await?;
        apply_upsert(&mut docs, incoming)?;
        self.write_collection(collection, &docs).await
    }

    async fn replace_all(&self, collection: &str, docs: Vec<Value>) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write_collection(collection, &docs).await
    }

    async fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut docs = self.read_collection(collection).await?;
        let removed = apply_delete(&mut docs, ids);
        if removed > 0 {
            self.write_collection(collection, &docs).await?;
        }
        Ok(removed)
    }
}
