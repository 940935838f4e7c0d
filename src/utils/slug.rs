use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\-]").unwrap());

static VALID_SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9\-]+$").unwrap());

/// 从分类名生成 slug：小写、空白换成连字符、只保留 `[a-z0-9-]`
///
/// 结果可能为空（例如名称全是符号），由调用方决定如何处理。
pub fn generate_slug(name: &str) -> String {
    // 转换为小写
    let slug = name.trim().to_lowercase();

    // 替换空白为连字符
    let slug = WHITESPACE_REGEX.replace_all(&slug, "-");

    // 移除所有非字母数字和连字符的字符
    SLUG_REGEX.replace_all(&slug, "").to_string()
}

/// 验证 slug 格式是否正确
pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > 100 {
        return false;
    }

    VALID_SLUG_REGEX.is_match(slug)
}

/// 为 slug 添加唯一后缀（如果需要的话）
pub fn make_slug_unique(base_slug: &str, existing_slugs: &[&str]) -> String {
    let mut slug = base_slug.to_string();
    let mut counter = 1;

    while existing_slugs.contains(&slug.as_str()) {
        counter += 1;
        slug = format!("{}-{}", base_slug, counter);
    }

    slug
}
