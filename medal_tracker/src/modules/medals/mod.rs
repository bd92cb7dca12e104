pub mod crawler;
pub mod fetcher;
pub mod guard;
pub mod schedule;
pub mod scraper;
pub mod store;
