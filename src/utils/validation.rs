use crate::error::{AppError, Result};
use crate::utils::slug;

/// 验证分类名称
pub fn validate_category_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("分类名称不能为空".to_string()));
    }

    if name.chars().count() > 100 {
        return Err(AppError::Validation("分类名称不能超过100个字符".to_string()));
    }

    Ok(())
}

/// 验证 slug，返回规范化后的值
pub fn validate_category_slug(value: &str) -> Result<String> {
    let value = value.trim();
    if !slug::is_valid_slug(value) {
        return Err(AppError::Validation(format!(
            "slug '{}' 只能包含小写字母、数字和连字符",
            value
        )));
    }
    Ok(value.to_string())
}

/// 验证库存阈值
pub fn validate_threshold(threshold: i64) -> Result<()> {
    if threshold < 0 {
        return Err(AppError::Validation("阈值不能为负数".to_string()));
    }
    Ok(())
}
