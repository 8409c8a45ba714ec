pub mod auth;
pub mod config;
pub mod doc;
pub mod dtos;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
