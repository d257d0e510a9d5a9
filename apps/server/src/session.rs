//! Session cart storage.
//!
//! The cart is kept as a JSON list under one session key and is read,
//! changed and written back on every cart request.

use caja_core::Cart;
use tower_sessions::Session;

use crate::error::ApiResult;

pub const CART_KEY: &str = "cart";

/// Loads the session cart, empty when nothing is stored yet.
pub async fn load_cart(session: &Session) -> ApiResult<Cart> {
    Ok(session.get::<Cart>(CART_KEY).await?.unwrap_or_default())
}

pub async fn save_cart(session: &Session, cart: &Cart) -> ApiResult<()> {
    session.insert(CART_KEY, cart).await?;
    Ok(())
}

/// Empties the cart after a successful checkout.
pub async fn clear_cart(session: &Session) -> ApiResult<()> {
    session.remove::<Cart>(CART_KEY).await?;
    Ok(())
}
