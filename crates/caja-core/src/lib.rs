//! # caja-core: Pure Business Logic for Caja POS
//!
//! This crate holds every rule of the point of sale that can be expressed
//! without touching a database: prices net of tax, the sale state machine,
//! cart mutation, sale numbering and dashboard time windows.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caja POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    caja-server (axum)                           │   │
//! │  │    /cart/* ──► session Cart       /sales/* ──► SaleEngine       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caja-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │ lifecycle │  │   cart    │  │  report   │  │   │
//! │  │   │ net price │  │ SaleState │  │   Cart    │  │  windows  │  │   │
//! │  │   │  margin   │  │Transition │  │ CartItem  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          caja-db (SQLite, Stock Ledger, Sale Engine)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer money type
//! - [`pricing`] - Tax-inclusive to net conversion, margins, line profit
//! - [`types`] - Domain types (Product, Sale, SaleLine, User)
//! - [`lifecycle`] - The sale state machine and its stock effects
//! - [`cart`] - Session cart mutation rules
//! - [`report`] - Dashboard time windows
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use caja_core::money::Money;
//! use caja_core::pricing::{net_price, profit_margin};
//!
//! let sale_net = net_price(Money::from_minor(17850), true);
//! assert_eq!(sale_net.amount(), 15000);
//!
//! assert_eq!(profit_margin(Money::from_minor(10000), sale_net), 50);
//! ```

pub mod cart;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod report;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{EditPlan, SaleState, StockEffect, Transition};
pub use money::Money;
pub use types::*;

/// Maximum distinct products in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in one sale line.
///
/// Guards against typing 1000 instead of 10 at the till.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Minimum length of a product search term.
pub const MIN_SEARCH_TERM_LEN: usize = 2;
