//! # Caja Server
//!
//! HTTP API for the Caja point of sale.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Caja Server                                     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Cart          │  │  Sales         │  │  Reports                   ││
//! │  │                │  │                │  │                            ││
//! │  │ • add / update │  │ • checkout     │  │ • dashboard                ││
//! │  │ • remove / init│  │ • status       │  │ • product search           ││
//! │  │ (session)      │  │ • cancel / edit│  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                              │                                          │
//! │                              ▼                                          │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  caja-db: repositories + SaleEngine (one transaction per call)   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_HOST` - Bind address (default: 0.0.0.0)
//! - `HTTP_PORT` - HTTP port (default: 8000)
//! - `DATABASE_PATH` - SQLite file (default: ./caja.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `LOG_LEVEL` - Log filter when `RUST_LOG` is unset (default: info)
//! - `SESSION_SECURE_COOKIE` - HTTPS-only session cookie (default: false)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod startup;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use startup::{build_router, AppState};
