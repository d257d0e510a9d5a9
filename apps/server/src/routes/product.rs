//! Product search for the till.

use axum::extract::{Query, State};
use axum::Json;
use caja_core::Product;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
}

/// What the search box shows for each hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub stock: i64,
    pub sale_price: i64,
}

impl From<Product> for ProductSummary {
    fn from(p: Product) -> Self {
        ProductSummary {
            id: p.id,
            name: p.name,
            brand: p.brand,
            stock: p.stock,
            sale_price: p.sale_price,
        }
    }
}

/// `GET /products/search?term=coca`
///
/// Terms shorter than two characters return `[]`, not an error.
pub async fn search(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ProductSummary>>> {
    let products = state.db.products().search(&query.term).await?;
    debug!(term = %query.term, hits = products.len(), "Product search");
    Ok(Json(products.into_iter().map(ProductSummary::from).collect()))
}
