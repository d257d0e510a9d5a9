//! # Repository Module
//!
//! Database repository implementations for Caja POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().search("coca")                                  │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── search(&self, term)                                               │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── insert(&self, new_product)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories read, and insert catalog rows. Sale rows and stock are   │
//! │  written only by the SaleEngine inside its transaction.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product search and lookup
//! - [`CategoryRepository`](category::CategoryRepository) - Categories
//! - [`UserRepository`](user::UserRepository) - Staff accounts
//! - [`SaleRepository`](sale::SaleRepository) - Sale and sale line reads, plus the
//!   in-transaction writes the engine uses
//! - [`ReportRepository`](report::ReportRepository) - Dashboard aggregates

pub mod category;
pub mod product;
pub mod report;
pub mod sale;
pub mod user;
