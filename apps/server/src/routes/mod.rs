//! # HTTP Handlers
//!
//! | Module | Routes |
//! |---|---|
//! | [`health`] | `GET /health` |
//! | [`product`] | `GET /products/search` |
//! | [`cart`] | `GET /cart`, `POST /cart/{add,update,init}`, `POST /cart/remove/:id` |
//! | [`sale`] | `GET /sales`, `POST /sales`, `GET /sales/:id`, `POST /sales/:id/{status,cancel,edit}` |
//! | [`dashboard`] | `GET /dashboard` |
//!
//! Every route except `/health` needs an `X-User-ID` header; see
//! [`CurrentUser`](crate::auth::CurrentUser).

pub mod cart;
pub mod dashboard;
pub mod health;
pub mod product;
pub mod sale;
