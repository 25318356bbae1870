// Core module definitions
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod server;
pub mod storage;

// Unified error handling
pub use error::{AppError, Result};

// Essential re-exports for convenience
pub use server::{app_state::AppState, startup::start_server};

pub use config::settings::{Config, DatabaseConfig, ServerConfig};

// Storage abstractions
pub use storage::{
    init_storage, memory::MemoryStorage, mysql::MySqlStorage, Storage, StorageError,
};

// Model exports
pub use models::{
    account::Account,
    identity::{AuthContext, VerifiedIdentity},
    profile::{AppProfile, LinkedProfile},
    session::{BlacklistEntry, Session},
};

// Session lifecycle services
pub use auth::{authority::SessionAuthority, linkedin::LinkedInClient, token::TokenSigner};

// Version and build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
