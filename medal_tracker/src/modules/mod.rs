pub mod handlers;
pub mod leagues;
pub mod medals;
pub mod migration;
pub mod store;
