pub mod stock_client;
