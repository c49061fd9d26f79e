//! Business logic services.

pub mod analytics;
pub mod auth;
pub mod client;
pub mod dashboard;
pub mod lead;
pub mod product;
pub mod purchase;
