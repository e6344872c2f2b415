pub mod app;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod http;
pub mod output;
pub mod regions;
pub mod registry;
pub mod store;
pub mod validate;
