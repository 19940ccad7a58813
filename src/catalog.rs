use crate::models::Product;

pub const ALL_CATEGORIES: &str = "all";

/// URL-safe slug: trimmed, lowercased, whitespace runs become `-`, and anything
/// outside `[a-z0-9-]` is dropped.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        }
    }
    slug
}

/// `"all"` followed by each distinct lowercased category, in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for category in products
        .iter()
        .filter_map(|p| p.category.as_deref())
        .map(str::to_lowercase)
        .filter(|c| !c.is_empty())
    {
        if !out.contains(&category) {
            out.push(category);
        }
    }
    out
}

pub fn matches_category(product: &Product, selected: &str) -> bool {
    selected.eq_ignore_ascii_case(ALL_CATEGORIES)
        || product
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase() == selected.to_lowercase())
}

pub fn filter_by_category(products: Vec<Product>, selected: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| matches_category(p, selected))
        .collect()
}
