//! Process configuration.
//!
//! Every flag can also be set through the environment. The listen address is
//! fixed at [`LISTEN_ADDR`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Parser, ValueEnum};

/// Where the server listens.
pub const LISTEN_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "wanderlust=info";

#[derive(Clone, Debug, Parser)]
#[command(name = "wanderlust", version, about = "Listings CRUD service")]
pub struct Config {
    /// SQLite database the listings live in, e.g. `sqlite://listings.db`.
    /// Listings are kept in memory only when unset.
    #[arg(long, env = "WANDERLUST_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Log output format.
    #[arg(long, env = "WANDERLUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pretty_logs() {
        let config = Config::try_parse_from(["wanderlust"]).unwrap();
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn flags_are_parsed() {
        let config = Config::try_parse_from([
            "wanderlust",
            "--database-url",
            "sqlite://listings.db",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("sqlite://listings.db"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn listens_on_8080() {
        assert_eq!(LISTEN_ADDR.port(), 8080);
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
