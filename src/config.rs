//! Configuration for Veranda
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Veranda - HTTP backend for real-estate listings
#[derive(Parser, Debug, Clone)]
#[command(name = "veranda")]
#[command(about = "Real-estate listing backend: properties, leads, and site visits over MongoDB")]
pub struct Args {
    /// Unique node identifier for this server instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "veranda")]
    pub mongodb_db: String,

    /// Directory holding the compiled frontend bundle
    #[arg(long, env = "STATIC_DIR", default_value = "dist")]
    pub static_dir: String,

    /// Enable development mode (server keeps running without a database)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.mongodb_uri.is_empty() {
            return Err("MONGODB_URI must not be empty".to_string());
        }

        if self.mongodb_db.is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).expect("args should parse")
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["veranda"]);
        assert_eq!(args.listen.port(), 5000);
        assert_eq!(args.mongodb_db, "veranda");
        assert_eq!(args.static_dir, "dist");
        assert!(!args.dev_mode);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_explicit_values() {
        let args = parse(&[
            "veranda",
            "--listen",
            "127.0.0.1:9000",
            "--mongodb-db",
            "listings",
            "--dev-mode",
        ]);
        assert_eq!(args.listen.port(), 9000);
        assert_eq!(args.mongodb_db, "listings");
        assert!(args.dev_mode);
    }

    #[test]
    fn test_validate_rejects_empty_db_name() {
        let args = parse(&["veranda", "--mongodb-db", ""]);
        assert!(args.validate().is_err());
    }
}
