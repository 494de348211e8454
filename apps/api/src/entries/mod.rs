pub mod handlers;
pub mod memory;
pub mod payload;
pub mod postgres;
pub mod repository;
pub mod store;
