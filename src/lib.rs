pub mod cart;
pub mod catalog;
pub mod config;
pub mod filters;
pub mod journey;
pub mod logging;
pub mod metrics;
pub mod mock;
pub mod model;
pub mod search;
pub mod session;
pub mod store;
pub mod verify;
pub mod wishlist;
