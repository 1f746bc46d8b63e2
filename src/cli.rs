//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::{Database, NewUser, hash_password};
use crate::jwt::TokenLifetimes;
use clap::Parser;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::time::Duration;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

const GENERATED_PASSWORD_LENGTH: usize = 24;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "tokenpair", about = "JWT access/refresh token service")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8090")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "tokenpair.db")]
    pub database: String,

    /// Service domain, used as token issuer and audience (e.g. "company.com")
    #[arg(long, default_value = "example.com")]
    pub domain: String,

    /// Domain attribute of the refresh cookie. Defaults to --domain
    #[arg(long)]
    pub cookie_domain: Option<String>,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TTL_SECS", default_value = "900")]
    pub access_ttl_secs: u64,

    /// Refresh token (and refresh cookie) lifetime in seconds
    #[arg(long, env = "REFRESH_TTL_SECS", default_value = "86400")]
    pub refresh_ttl_secs: u64,

    /// Refresh tokens are only rotated once they have at most this many seconds left
    #[arg(long, default_value = "30")]
    pub refresh_window_secs: u64,

    /// Create an admin user with this email on startup and print its generated password
    #[arg(long, value_name = "EMAIL")]
    pub create_admin: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    validate_jwt_secret(&secret).then_some(secret)
}

fn validate_jwt_secret(secret: &str) -> bool {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return false;
    }
    true
}

/// Handle --create-admin: create the admin with a random password, or report
/// that the email is already taken.
pub async fn handle_create_admin(db: &Database, email: &str) {
    match db.users().get_by_email(email).await {
        Ok(Some(existing)) => {
            println!();
            println!("User already exists: {} (id {})", existing.email, existing.id);
            println!();
        }
        Ok(None) => {
            let password = generate_password();
            let password_hash = match hash_password(&password) {
                Ok(hash) => hash,
                Err(e) => {
                    error!(error = %e, "Failed to hash admin password");
                    std::process::exit(1);
                }
            };

            let new_user = NewUser {
                first_name: "Admin",
                last_name: "User",
                email,
                password_hash: &password_hash,
                is_admin: true,
            };
            match db.users().create(new_user).await {
                Ok(id) => {
                    info!(user_id = id, "Admin user created");
                    println!();
                    println!("Admin user created: {}", email);
                    println!("Password: {}", password);
                    println!();
                }
                Err(e) => {
                    error!(error = %e, "Failed to create admin user");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to check for existing admin");
            std::process::exit(1);
        }
    }
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database, jwt_secret: String) -> ServerConfig {
    ServerConfig {
        db,
        domain: args.domain.clone(),
        cookie_domain: args
            .cookie_domain
            .clone()
            .unwrap_or_else(|| args.domain.clone()),
        jwt_secret: jwt_secret.into_bytes(),
        lifetimes: TokenLifetimes {
            access: Duration::from_secs(args.access_ttl_secs),
            refresh: Duration::from_secs(args.refresh_ttl_secs),
        },
        refresh_window: Duration::from_secs(args.refresh_window_secs),
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
