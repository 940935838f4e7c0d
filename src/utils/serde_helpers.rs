//! 用于处理 PATCH 语义的序列化/反序列化辅助模块

use serde::{Deserialize, Deserializer};

/// 区分 "字段缺省" 与 "字段显式为 null"
///
/// 配合 `#[serde(default, deserialize_with = "double_option::deserialize")]` 使用：
/// 缺省得到 `None`，`null` 得到 `Some(None)`，具体值得到 `Some(Some(v))`。
pub mod double_option {
    use super::*;

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// 查询参数中的空字符串视为未提供
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
