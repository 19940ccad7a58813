use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppError, models::Product};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    /// Category to show; `all` (the default) disables filtering.
    pub category: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CatalogView {
    pub items: Vec<Product>,
    /// `all` first, then each distinct lowercased category.
    pub categories: Vec<String>,
    pub selected: String,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

/// An uploaded product image.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Validated admin product form.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub category: Option<String>,
    pub soldout: bool,
    pub description: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub materials: Option<Vec<String>>,
    pub image: Option<ImageUpload>,
}

/// Multipart body accepted by the admin create/update routes. Documentation only;
/// the handlers read the fields into [`ProductFormFields`].
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ProductFormSchema {
    pub name: String,
    pub price: String,
    pub category: Option<String>,
    pub soldout: Option<bool>,
    pub description: Option<String>,
    /// Comma separated.
    pub sizes: Option<String>,
    /// Comma separated.
    pub materials: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

/// Raw multipart fields as received, before validation.
#[derive(Debug, Default)]
pub struct ProductFormFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub soldout: Option<String>,
    pub description: Option<String>,
    pub sizes: Option<String>,
    pub materials: Option<String>,
    pub image: Option<ImageUpload>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Comma separated list, trimmed, empties dropped; `None` when nothing is left.
pub fn split_list(value: Option<&str>) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() { None } else { Some(items) }
}

fn parse_flag(value: Option<&str>) -> Result<bool, AppError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("off") | Some("0") => Ok(false),
        Some("true") | Some("on") | Some("1") => Ok(true),
        Some(other) => Err(AppError::BadRequest(format!(
            "soldout must be a boolean, got {other:?}"
        ))),
    }
}

impl ProductFormFields {
    pub fn validate(self) -> Result<ProductForm, AppError> {
        let (Some(name), Some(price)) = (non_empty(self.name), non_empty(self.price)) else {
            return Err(AppError::BadRequest("Name and price required".into()));
        };
        Ok(ProductForm {
            name,
            price,
            category: non_empty(self.category),
            soldout: parse_flag(self.soldout.as_deref())?,
            description: non_empty(self.description),
            sizes: split_list(self.sizes.as_deref()),
            materials: split_list(self.materials.as_deref()),
            image: self.image.filter(|image| !image.bytes.is_empty()),
        })
    }
}
