pub mod activity;
pub mod store;
