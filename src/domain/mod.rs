//! Marketplace entities, the rules they enforce on themselves, and the ports
//! the application layer talks to.

pub mod cart;
pub mod catalog;
pub mod invoice;
pub mod money;
pub mod order;
pub mod page;
pub mod payment;
pub mod ports;
pub mod user;
