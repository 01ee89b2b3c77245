pub mod audit;
pub mod auth;
pub mod cache;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
