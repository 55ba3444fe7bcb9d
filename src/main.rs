//! Command-line driver for persistent HTTP login sessions
//!
//! # Usage
//!
//! ## Check session state
//! ```bash
//! relogin status https://example.com --probe-url https://example.com/account
//! ```
//!
//! ## Log in
//! ```bash
//! relogin login https://example.com \
//!     --login-url https://example.com/login \
//!     --data user=alice --data password=secret \
//!     --probe-url https://example.com/account
//! ```
//!
//! ## Help and Version
//! ```bash
//! relogin --version
//! relogin --help
//! relogin login --help
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use relogin::cli::{LoginArgs, StatusArgs, run_login_mode, run_status_mode};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "relogin")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report cache and login state for a site
    Status {
        /// Site URL (determines the default cache file)
        site: String,

        /// URL probed to detect login state
        #[arg(long, value_name = "URL")]
        probe_url: Option<String>,

        /// Body marker switching detection to marker mode
        #[arg(long, value_name = "TEXT")]
        marker: Option<String>,

        /// Configuration file path
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Log in to a site, reusing the cached session when still valid
    Login {
        /// Site URL (determines the default cache file)
        site: String,

        /// URL the login form POSTs to
        #[arg(long, value_name = "URL")]
        login_url: String,

        /// Form field, repeatable (key=value)
        #[arg(long, value_name = "KEY=VALUE")]
        data: Vec<String>,

        /// URL probed to detect login state
        #[arg(long, value_name = "URL")]
        probe_url: Option<String>,

        /// Body marker switching detection to marker mode
        #[arg(long, value_name = "TEXT")]
        marker: Option<String>,

        /// Log in even if the probe says the session is still valid
        #[arg(short, long)]
        force: bool,

        /// Configuration file path
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status {
            site,
            probe_url,
            marker,
            config,
            verbose,
        } => {
            let args = StatusArgs {
                site,
                probe_url,
                marker,
                config,
                verbose,
            };
            run_status_mode(args).await
        }
        Commands::Login {
            site,
            login_url,
            data,
            probe_url,
            marker,
            force,
            config,
            verbose,
        } => {
            let args = LoginArgs {
                site,
                login_url,
                data,
                probe_url,
                marker,
                force,
                config,
                verbose,
            };
            run_login_mode(args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_status_subcommand() {
        let cli = Cli::parse_from([
            "relogin",
            "status",
            "https://example.com",
            "--probe-url",
            "https://example.com/account",
        ]);

        match cli.command {
            Commands::Status {
                site, probe_url, ..
            } => {
                assert_eq!(site, "https://example.com");
                assert_eq!(probe_url, Some("https://example.com/account".to_string()));
            }
            _ => panic!("Expected status subcommand"),
        }
    }

    #[test]
    fn test_login_subcommand_with_repeated_data() {
        let cli = Cli::parse_from([
            "relogin",
            "login",
            "https://example.com",
            "--login-url",
            "https://example.com/login",
            "--data",
            "user=alice",
            "--data",
            "password=secret",
            "--force",
        ]);

        match cli.command {
            Commands::Login {
                login_url,
                data,
                force,
                ..
            } => {
                assert_eq!(login_url, "https://example.com/login");
                assert_eq!(data, vec!["user=alice", "password=secret"]);
                assert!(force);
            }
            _ => panic!("Expected login subcommand"),
        }
    }

    #[test]
    fn test_login_requires_login_url() {
        let result = Cli::try_parse_from(["relogin", "login", "https://example.com"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommand_required() {
        let result = Cli::try_parse_from(["relogin"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_default_values() {
        let cli = Cli::parse_from(["relogin", "status", "https://example.com"]);

        match cli.command {
            Commands::Status {
                probe_url,
                marker,
                config,
                verbose,
                ..
            } => {
                assert_eq!(probe_url, None);
                assert_eq!(marker, None);
                assert_eq!(config, None);
                assert!(!verbose);
            }
            _ => panic!("Expected status subcommand"),
        }
    }
}
