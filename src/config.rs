use std::str::FromStr;

use crate::error::Error;

pub static POSTGRES_CONN: &str = "POSTGRES_CONN";
pub static SERVER_ADDRESS: &str = "SERVER_ADDRESS";
pub static POSTGRES_MAX_CONNECTIONS: &str = "POSTGRES_MAX_CONNECTIONS";
pub static RUN_MIGRATIONS: &str = "RUN_MIGRATIONS";
pub static DEDUPLICATE_APPROVALS: &str = "DEDUPLICATE_APPROVALS";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_address: String,
    pub max_connections: u32,
    pub run_migrations: bool,
    /// When set, a repeated approval from the same approver is recorded but
    /// not counted towards the quorum.
    pub dedupe_approvals: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            server_address: "0.0.0.0:8080".into(),
            max_connections: 5,
            run_migrations: true,
            dedupe_approvals: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let database_url = lookup(POSTGRES_CONN).ok_or_else(|| Error::Config(format!("environment variable {} not been set", POSTGRES_CONN)))?;
        Ok(Self {
            database_url,
            server_address: lookup(SERVER_ADDRESS).unwrap_or(defaults.server_address),
            max_connections: parse_or(&lookup, POSTGRES_MAX_CONNECTIONS, defaults.max_connections)?,
            run_migrations: parse_or(&lookup, RUN_MIGRATIONS, defaults.run_migrations)?,
            dedupe_approvals: parse_or(&lookup, DEDUPLICATE_APPROVALS, defaults.dedupe_approvals)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| Error::Config(format!("invalid value for {}: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[(POSTGRES_CONN, "postgres://localhost/tenders")])).unwrap();
        assert_eq!(config.database_url, "postgres://localhost/tenders");
        assert_eq!(config.server_address, "0.0.0.0:8080");
        assert_eq!(config.max_connections, 5);
        assert!(config.run_migrations);
        assert!(!config.dedupe_approvals);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (POSTGRES_CONN, "postgres://db/tenders"),
            (SERVER_ADDRESS, "127.0.0.1:9000"),
            (POSTGRES_MAX_CONNECTIONS, "12"),
            (RUN_MIGRATIONS, "false"),
            (DEDUPLICATE_APPROVALS, "true"),
        ]))
        .unwrap();
        assert_eq!(config.server_address, "127.0.0.1:9000");
        assert_eq!(config.max_connections, 12);
        assert!(!config.run_migrations);
        assert!(config.dedupe_approvals);
    }

    #[test]
    fn test_missing_connection_string() {
        assert!(matches!(Config::from_lookup(lookup(&[])), Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_value() {
        let res = Config::from_lookup(lookup(&[(POSTGRES_CONN, "postgres://db"), (POSTGRES_MAX_CONNECTIONS, "many")]));
        assert!(matches!(res, Err(Error::Config(_))));
    }
}
