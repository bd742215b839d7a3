/// Configuration management for the hoot service
///
/// All settings come from environment variables at process start; a `.env`
/// file is honored when present (loaded by the bootstrap).

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token verification configuration
    pub auth: AuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    pub uri: String,
    /// Database name, used when the connection string names none
    pub database: String,
}

/// Token verification configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret the auth subsystem signs bearer tokens with
    pub jwt_secret: String,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, or `*`
    pub allowed_origins: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("HOOT_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(3000),
            },
            database: DatabaseConfig {
                uri: std::env::var("MONGODB_URI").map_err(|_| "MONGODB_URI must be set".to_string())?,
                database: std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "hoot".to_string()),
            },
            auth: AuthConfig {
                jwt_secret: std::env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?,
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string()),
            },
        })
    }
}
