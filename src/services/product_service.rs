use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    catalog::{self, ALL_CATEGORIES},
    dto::products::{CatalogQuery, CatalogView},
    entity::products::{Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::Product,
    response::ApiResponse,
    state::AppState,
};

/// Every product, newest first.
pub async fn all_products(state: &AppState) -> AppResult<Vec<Product>> {
    let items = Products::find()
        .order_by_desc(Column::CreatedAt)
        .all(state.db())
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    Ok(items)
}

/// Catalog page data: the full category list is derived before filtering, so
/// the tabs stay stable while a category is selected.
pub async fn catalog(state: &AppState, query: CatalogQuery) -> AppResult<ApiResponse<CatalogView>> {
    let products = all_products(state).await?;
    let categories = catalog::categories(&products);
    let selected = query
        .category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());
    let items = catalog::filter_by_category(products, &selected);

    let total = items.len();
    Ok(ApiResponse::listed(
        "Products",
        CatalogView {
            items,
            categories,
            selected,
        },
        total,
    ))
}

pub async fn get_by_slug(state: &AppState, slug: &str) -> AppResult<ApiResponse<Product>> {
    let result = Products::find()
        .filter(Column::Slug.eq(slug))
        .order_by_desc(Column::CreatedAt)
        .one(state.db())
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", result, None))
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        slug: model.slug,
        name: model.name,
        price: model.price,
        category: model.category,
        soldout: model.soldout,
        description: model.description,
        imageurl: model.imageurl,
        availablesizes: model.availablesizes,
        availablematerials: model.availablematerials,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
