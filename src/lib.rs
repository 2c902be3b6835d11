pub mod app;
pub mod config;
pub mod controller;
pub mod errors;
pub mod flow;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod quotes;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use controller::GoalController;
pub use state::AppState;
pub use storage::GoalStore;
