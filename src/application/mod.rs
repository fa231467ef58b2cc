//! Application layer containing the marketplace's business operations.
//!
//! `Marketplace` owns the stores, the payment gateway and the session signer.
//! Its operations are split by area, one `impl` block per file, and every one
//! of them takes the calling `Principal` when access depends on who asks.

pub mod admin;
pub mod auth;
pub mod billing;
pub mod cart;
pub mod catalog;
pub mod marketplace;
pub mod orders;
pub mod payments;

pub use admin::{MarketplaceStats, UserDirectoryEntry, UserQuery};
pub use marketplace::{Marketplace, MarketplaceConfig, Principal};
