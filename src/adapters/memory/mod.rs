pub mod book_catalog;
pub mod event_publisher;
pub mod stock_ledger;
pub mod user_directory;
