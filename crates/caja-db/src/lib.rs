//! # caja-db: Database Layer for Caja POS
//!
//! SQLite storage for products, users and sales, plus the two components
//! that own transactions: the [`StockLedger`] and the [`SaleEngine`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caja POS Data Flow                               │
//! │                                                                         │
//! │  POST /sales (caja-server)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     caja-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  SaleEngine   │───►│  StockLedger  │    │  Migrations  │  │   │
//! │  │   │  (engine.rs)  │    │  (ledger.rs)  │    │  (embedded)  │  │   │
//! │  │   │ one tx per op │    │ deduct/restore│    │ 001_init.sql │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────▼───────┐    ┌───────────────┐                       │   │
//! │  │   │ Repositories  │    │   Database    │                       │   │
//! │  │   │ product, sale │◄───│   (pool.rs)   │                       │   │
//! │  │   │ user, report  │    │  SqlitePool   │                       │   │
//! │  │   └───────────────┘    └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SQLite Database (WAL)                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`ledger`] - Stock movements
//! - [`engine`] - Sale lifecycle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caja_db::{Database, DbConfig};
//! use caja_core::{PaymentMethod, SaleStatus};
//!
//! let db = Database::new(DbConfig::new("caja.db")).await?;
//!
//! let products = db.products().search("coca").await?;
//! let sale = db
//!     .engine()
//!     .checkout(&cart, PaymentMethod::Cash, SaleStatus::Completed, Some(user.id))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::SaleEngine;
pub use error::{DbError, DbResult, SaleError, SaleResult};
pub use ledger::StockLedger;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::report::ReportRepository;
pub use repository::sale::{SaleFilter, SaleLineDetail, SaleRepository};
pub use repository::user::UserRepository;
