pub mod adapters;
pub mod api;
pub mod application;
pub mod domain;
pub mod ports;
pub mod scheduler;
