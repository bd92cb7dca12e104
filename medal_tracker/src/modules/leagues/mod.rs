pub mod service;
pub mod slug;
pub mod standings;
pub mod store;
pub mod validation;
