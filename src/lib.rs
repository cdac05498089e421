pub mod api;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod middleware;
pub mod models;
pub mod query;
pub mod routes;
pub mod schema;
pub mod state;
pub mod utils;
