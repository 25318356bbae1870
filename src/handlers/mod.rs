// Route handler modules
pub mod api;
pub mod auth_handler;
pub mod health;
