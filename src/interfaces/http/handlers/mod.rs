pub mod admin;
pub mod auth;
pub mod billing;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod payments;
pub mod users;
