//! # Cart Handlers
//!
//! The cart lives in the server-side session until checkout.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐                        │
//! │  │  Empty   │────►│ In Cart  │────►│   Sale   │                        │
//! │  │  Cart    │     │          │     │ (engine) │                        │
//! │  └──────────┘     └──────────┘     └──────────┘                        │
//! │        ▲               │                │                              │
//! │        │          /cart/add        POST /sales                         │
//! │        │          /cart/update          │                              │
//! │        │          /cart/remove          │                              │
//! │        │          /cart/init            │                              │
//! │        └────────────────────────────────┘ cleared on success only      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is checked when items are added, but nothing is reserved until
//! checkout.

use axum::extract::{Path, State};
use axum::Json;
use caja_core::{Cart, CartItem, CoreError};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::debug;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::session::{load_cart, save_cart};
use crate::startup::AppState;

/// Every cart route answers with the whole cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: Cart,
    pub total: i64,
}

impl TryFrom<Cart> for CartResponse {
    type Error = CoreError;

    fn try_from(cart: Cart) -> Result<Self, Self::Error> {
        Ok(CartResponse {
            success: true,
            total: cart.total()?.amount(),
            cart,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: i64,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItem {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct InitCart {
    pub cart: Vec<CartItem>,
}

/// `GET /cart`
pub async fn get_cart(
    CurrentUser(_user): CurrentUser,
    session: Session,
) -> ApiResult<Json<CartResponse>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartResponse::try_from(cart)?))
}

/// `POST /cart/add`
///
/// Merges into an existing row. The merged quantity must fit in stock.
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    session: Session,
    Json(req): Json<AddItem>,
) -> ApiResult<Json<CartResponse>> {
    debug!(product_id = req.product_id, quantity = req.quantity, "Adding to cart");

    let product = state
        .db
        .products()
        .get_by_id(req.product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(req.product_id))?;

    let mut cart = load_cart(&session).await?;
    cart.add(&product, req.quantity)?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartResponse::try_from(cart)?))
}

/// `POST /cart/update`
///
/// Products that are not in the cart are left out; the cart comes back
/// unchanged.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    session: Session,
    Json(req): Json<UpdateItem>,
) -> ApiResult<Json<CartResponse>> {
    let product = state
        .db
        .products()
        .get_by_id(req.product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(req.product_id))?;

    let mut cart = load_cart(&session).await?;
    if cart.update(&product, req.quantity)? {
        save_cart(&session, &cart).await?;
    }

    Ok(Json(CartResponse::try_from(cart)?))
}

/// `POST /cart/remove/:product_id`
pub async fn remove(
    CurrentUser(_user): CurrentUser,
    session: Session,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(product_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(Json(CartResponse::try_from(cart)?))
}

/// `POST /cart/init`
///
/// Replaces the cart wholesale, as when a sale is reopened for editing.
/// Quantities, prices and the total are checked here; stock is left to
/// checkout.
pub async fn init(
    CurrentUser(_user): CurrentUser,
    session: Session,
    Json(req): Json<InitCart>,
) -> ApiResult<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.replace(req.cart)?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartResponse::try_from(cart)?))
}
