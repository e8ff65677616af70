pub mod api_docs;
pub mod calculate;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod models;
pub mod util;
