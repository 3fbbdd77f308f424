//! # Catalog Handlers
//!
//! Product registration, editing, deletion and lookup.
//!
//! ## Edit Form Stock Fields
//! ```text
//! add_stock > 0              → stock += add_stock      (delivery top-up)
//! add_stock = 0, new_stock   → stock  = new_stock      (physical count)
//! neither                    → stock unchanged
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sgventas_core::validation::validate_search_query;
use sgventas_core::{NewProduct, Product, ProductUpdate};
use tracing::debug;

use super::{AmountInput, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::state::{ConfigState, DbState};

/// Product as shown on the catalog screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDto {
    pub barcode: String,
    pub name: String,
    pub price_cents: i64,
    /// Price formatted with the store currency, e.g. `$1,234.50`.
    pub price: String,
    pub stock: i64,
    pub updated_at: DateTime<Utc>,
}

impl ProductDto {
    pub fn new(product: Product, config: &ConfigState) -> Self {
        ProductDto {
            price: config.format_currency(product.price()),
            barcode: product.barcode,
            name: product.name,
            price_cents: product.price_cents,
            stock: product.stock,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub barcode: String,
    pub name: String,
    pub price: AmountInput,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub price: AmountInput,
    #[serde(default)]
    pub add_stock: i64,
    /// Counted stock. Omit to leave stock as is.
    pub new_stock: Option<i64>,
}

/// `GET /api/products?q=`: whole catalog, or names containing `q`.
pub async fn list_products(
    State(db): State<DbState>,
    State(config): State<ConfigState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<Vec<ProductDto>>> {
    let filter = validate_search_query(query.q.as_deref().unwrap_or(""))?;
    let products = db.inner().products().list(filter.as_deref()).await?;

    debug!(filter = ?filter, count = products.len(), "Listed products");
    Ok(Json(
        products
            .into_iter()
            .map(|p| ProductDto::new(p, &config))
            .collect(),
    ))
}

pub async fn get_product(
    State(db): State<DbState>,
    State(config): State<ConfigState>,
    ApiPath(barcode): ApiPath<String>,
) -> ApiResult<Json<ProductDto>> {
    let product = db.inner().products().require(&barcode).await?;
    Ok(Json(ProductDto::new(product, &config)))
}

pub async fn create_product(
    State(db): State<DbState>,
    State(config): State<ConfigState>,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductDto>)> {
    let new = NewProduct::from_form(&req.barcode, &req.name, &req.price.to_text(), req.stock)?;
    let product = db.inner().products().create(&new).await?;
    Ok((StatusCode::CREATED, Json(ProductDto::new(product, &config))))
}

pub async fn update_product(
    State(db): State<DbState>,
    State(config): State<ConfigState>,
    ApiPath(barcode): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateProductRequest>,
) -> ApiResult<Json<ProductDto>> {
    let update =
        ProductUpdate::from_form(&req.name, &req.price.to_text(), req.add_stock, req.new_stock)?;

    let product = db.inner().products().update(&barcode, &update).await?;
    Ok(Json(ProductDto::new(product, &config)))
}

pub async fn delete_product(
    State(db): State<DbState>,
    ApiPath(barcode): ApiPath<String>,
) -> ApiResult<StatusCode> {
    db.inner().products().delete(&barcode).await?;
    Ok(StatusCode::NO_CONTENT)
}
