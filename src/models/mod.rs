pub mod account;
pub mod identity;
pub mod profile;
pub mod session;

// re-export types from parent modules
pub use account::Account;
pub use identity::{AuthContext, VerifiedIdentity};
pub use profile::{AppProfile, LinkedProfile};
pub use session::{BlacklistEntry, Session};
