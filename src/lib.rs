pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod routes;
pub mod utils;
