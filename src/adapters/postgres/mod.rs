pub mod loan_store;
