//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading, the shared server state,
//! and system routes that every deployment exposes.
//!
//! ## Config loading
//! ```rust,no_run
//! use sbox_kernel::config::load_config;
//! use sbox_kernel::domain::config::AppConfig;
//!
//! let cfg: AppConfig = load_config(None::<&str>).unwrap();
//! println!("listening on port {}", cfg.server.port);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use sbox_domain as domain;
