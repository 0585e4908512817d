pub mod config;
pub mod db;
pub mod geocoding;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use state::AppState;
