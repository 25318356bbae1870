pub mod app_state;
pub mod cleanup;
pub mod startup;

pub use app_state::AppState;
pub use startup::start_server;
