pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod range;
pub mod source;
pub mod state;
pub mod stats;
pub mod ui;
pub mod weekly;

pub use app::router;
pub use config::Config;
pub use state::AppState;
