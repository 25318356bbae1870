// Centralized configuration constants

// HTTP server
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const HTTP_KEEPALIVE_SECS: u64 = 75;
pub const HTTP_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// Auth
/// 7 days
pub const DEFAULT_JWT_TTL_SECS: i64 = 7 * 24 * 3600;
pub const DEFAULT_BLACKLIST_SWEEP_INTERVAL_SECS: u64 = 3600;

// Database (MySQL)
pub const DEFAULT_DB_USER: &str = "linkup";
pub const DEFAULT_DB_PASS: &str = "linkup";
pub const DEFAULT_DB_NAME: &str = "linkup";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_POOL: u32 = 5;
pub const DEFAULT_DB_CONN_TIMEOUT_SECS: u64 = 30;

// LinkedIn OAuth (OpenID Connect)
pub const LINKEDIN_AUTH_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
pub const LINKEDIN_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
pub const LINKEDIN_USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";
pub const LINKEDIN_SCOPE: &str = "openid profile email";
pub const DEFAULT_LINKEDIN_REDIRECT_URI: &str = "http://localhost:8080/auth/linkedin/callback";

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "compact";

// CORS
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 3600;
