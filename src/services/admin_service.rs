use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    catalog::slugify,
    dto::products::{ImageUpload, ProductForm, ProductList},
    entity::products::{ActiveModel, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{AdminProfile, Product},
    response::{ApiResponse, Meta},
    services::product_service::{all_products, product_from_entity},
    state::AppState,
    storage::product_image_key,
};

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AdminProfile>> {
    let profile = ensure_admin(state, user).await?;
    Ok(ApiResponse::success("Admin", profile, Some(Meta::now())))
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(state, user).await?;
    let items = all_products(state).await?;
    let total = items.len();
    Ok(ApiResponse::listed("Products", ProductList { items }, total))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(state, user).await?;
    let id = Uuid::new_v4();

    let imageurl = match form.image {
        Some(ref image) => Some(upload_image(state, id, image).await?),
        None => None,
    };

    let active = ActiveModel {
        id: Set(id),
        slug: Set(slugify(&form.name)),
        name: Set(form.name),
        price: Set(form.price),
        category: Set(form.category),
        soldout: Set(form.soldout),
        description: Set(form.description),
        imageurl: Set(imageurl.clone()),
        availablesizes: Set(form.sizes),
        availablematerials: Set(form.materials),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = match active.insert(state.db()).await {
        Ok(product) => product,
        Err(err) => {
            if let Some(url) = imageurl {
                remove_image(state, &url).await;
            }
            return Err(err.into());
        }
    };

    audit::record(
        state.db(),
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::now()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(state, user).await?;
    let existing = Products::find_by_id(id).one(state.db()).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    let previous_image = existing.imageurl.clone();

    let new_image = match form.image {
        Some(ref image) => Some(upload_image(state, id, image).await?),
        None => None,
    };

    let mut active: ActiveModel = existing.into();
    active.slug = Set(slugify(&form.name));
    active.name = Set(form.name);
    active.price = Set(form.price);
    active.category = Set(form.category);
    active.soldout = Set(form.soldout);
    active.description = Set(form.description);
    active.availablesizes = Set(form.sizes);
    active.availablematerials = Set(form.materials);
    if let Some(url) = &new_image {
        active.imageurl = Set(Some(url.clone()));
    }
    active.updated_at = Set(Utc::now().into());

    let product = match active.update(state.db()).await {
        Ok(product) => product,
        Err(err) => {
            if let Some(url) = new_image {
                remove_image(state, &url).await;
            }
            return Err(err.into());
        }
    };

    // The replaced image is no longer referenced by any row.
    if let (Some(_), Some(old)) = (&new_image, previous_image) {
        if product.imageurl.as_deref() != Some(old.as_str()) {
            remove_image(state, &old).await;
        }
    }

    audit::record(
        state.db(),
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::now()),
    ))
}

/// Delete the row, then the image it pointed at.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(state, user).await?;
    let existing = Products::find_by_id(id).one(state.db()).await?;
    let Some(existing) = existing else {
        return Err(AppError::NotFound);
    };

    let result = Products::delete_by_id(id).exec(state.db()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Some(url) = existing.imageurl.as_deref() {
        remove_image(state, url).await;
    }

    audit::record(
        state.db(),
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::now()),
    ))
}

async fn upload_image(state: &AppState, product_id: Uuid, image: &ImageUpload) -> AppResult<String> {
    let key = product_image_key(product_id, Utc::now().timestamp_millis(), &image.filename);
    state
        .storage
        .put(&key, image.bytes.clone(), &image.content_type)
        .await?;
    tracing::debug!(%product_id, key, "uploaded product image");
    Ok(state.storage.public_url(&key))
}

/// Best-effort removal of a stored image; failures are logged only.
async fn remove_image(state: &AppState, url: &str) {
    let Some(key) = state.storage.key_from_url(url) else {
        tracing::debug!(url, "image url is not in our bucket, leaving it");
        return;
    };
    if let Err(err) = state.storage.remove(&key).await {
        tracing::warn!(error = %err, key, "failed to remove product image");
    }
}
