//! # Sale Handlers
//!
//! Each handler is one call into the [`SaleEngine`](caja_db::SaleEngine),
//! which runs one transaction. The session cart is cleared only after a
//! checkout has committed.

use axum::extract::{Path, Query, State};
use axum::Json;
use caja_core::{Cart, CartItem, CoreError, PaymentMethod, Sale, SaleStatus};
use caja_db::{SaleFilter, SaleLineDetail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::session::{clear_cart, load_cart};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: SaleStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub redirect_url: String,
    pub sale: Sale,
}

/// Query string of `GET /sales`, e.g. `?date=2024-03-15&status=PENDING`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<SaleStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub limit: Option<u32>,
}

impl From<ListQuery> for SaleFilter {
    fn from(query: ListQuery) -> Self {
        let defaults = SaleFilter::default();
        SaleFilter {
            date: query.date,
            status: query.status,
            payment_method: query.payment_method,
            limit: query.limit.unwrap_or(defaults.limit),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleList {
    pub sales: Vec<Sale>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: SaleStatus,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub cart: Vec<CartItem>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: SaleStatus,
}

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub success: bool,
    pub sale: Sale,
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        SaleResponse { success: true, sale }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleDetail {
    pub sale: Sale,
    pub lines: Vec<SaleLineDetail>,
}

/// `POST /sales`
///
/// Turns the session cart into a sale.
pub async fn checkout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    session: Session,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let cart = load_cart(&session).await?;

    let sale = state
        .db
        .engine()
        .checkout(&cart, req.payment_method, req.status, Some(user.id))
        .await?;

    clear_cart(&session).await?;

    Ok(Json(CheckoutResponse {
        success: true,
        redirect_url: format!("/sales/{}", sale.id),
        sale,
    }))
}

/// `GET /sales`
///
/// Newest first, narrowed by any of day, status and payment method.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<SaleList>> {
    let sales = state.db.sales().list(&query.into()).await?;
    Ok(Json(SaleList { sales }))
}

/// `GET /sales/:id`
pub async fn get_sale(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<SaleDetail>> {
    let sale = state
        .db
        .sales()
        .get_by_id(id)
        .await?
        .ok_or(CoreError::SaleNotFound(id))?;
    let lines = state.db.sales().lines_detailed(id).await?;

    Ok(Json(SaleDetail { sale, lines }))
}

/// `POST /sales/:id/status`
pub async fn change_status(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<SaleResponse>> {
    let sale = state
        .db
        .engine()
        .change_status(id, req.status, req.payment_method)
        .await?;
    Ok(Json(sale.into()))
}

/// `POST /sales/:id/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<SaleResponse>> {
    let sale = state.db.engine().cancel(id).await?;
    Ok(Json(sale.into()))
}

/// `POST /sales/:id/edit`
///
/// Admins only. Replaces every line of the sale.
pub async fn edit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<EditRequest>,
) -> ApiResult<Json<SaleResponse>> {
    let cart = Cart::try_from_items(req.cart)?;
    let sale = state
        .db
        .engine()
        .edit(id, &cart, req.payment_method, req.status, &user)
        .await?;
    Ok(Json(sale.into()))
}
