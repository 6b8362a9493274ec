// src/config.rs
use std::net::IpAddr;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// At most one week.
const ACCESS_TOKEN_MINUTES: RangeInclusive<i64> = 1..=10_080;
const REFRESH_TOKEN_DAYS: RangeInclusive<i64> = 1..=3_650;
/// The work factors bcrypt accepts.
const BCRYPT_COST: RangeInclusive<u32> = 4..=31;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
    pub spa_index_path: PathBuf,
    pub cors_allowed_origins: Vec<String>,
    pub blacklist_purge_interval_secs: u64,
}

impl Config {
    /// Reads settings from the process environment. Call `dotenvy::dotenv()` first
    /// if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: parse_or("HOST", get("HOST"), IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or("PORT", get("PORT"), 8000)?,
            database_url: get("DATABASE_URL"),
            jwt_secret,
            access_token_minutes: parse_in(
                "ACCESS_TOKEN_MINUTES",
                get("ACCESS_TOKEN_MINUTES"),
                5,
                ACCESS_TOKEN_MINUTES,
            )?,
            refresh_token_days: parse_in("REFRESH_TOKEN_DAYS", get("REFRESH_TOKEN_DAYS"), 1, REFRESH_TOKEN_DAYS)?,
            bcrypt_cost: parse_in("BCRYPT_COST", get("BCRYPT_COST"), bcrypt::DEFAULT_COST, BCRYPT_COST)?,
            cookie_secure: parse_or("COOKIE_SECURE", get("COOKIE_SECURE"), true)?,
            spa_index_path: get("SPA_INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("frontend/build/index.html")),
            cors_allowed_origins,
            blacklist_purge_interval_secs: parse_or(
                "BLACKLIST_PURGE_INTERVAL_SECS",
                get("BLACKLIST_PURGE_INTERVAL_SECS"),
                3600,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_in<T>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + ToString,
{
    let value = parse_or(name, raw, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { name, value: value.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.access_token_minutes, 5);
        assert_eq!(config.refresh_token_days, 1);
        assert!(config.cookie_secure);
        assert!(config.database_url.is_none());
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "9000")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn invalid_number_is_reported_with_its_name() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "x"), ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "x"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://ecopulse.app ,"),
        ]))
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000".to_string(), "https://ecopulse.app".to_string()]
        );
    }

    #[test]
    fn lifetimes_and_cost_must_be_in_range() {
        for (name, value) in [
            ("ACCESS_TOKEN_MINUTES", "0"),
            ("ACCESS_TOKEN_MINUTES", "-5"),
            ("ACCESS_TOKEN_MINUTES", "10081"),
            ("REFRESH_TOKEN_DAYS", "-1"),
            ("REFRESH_TOKEN_DAYS", "1000000000"),
            ("BCRYPT_COST", "3"),
            ("BCRYPT_COST", "32"),
        ] {
            let err = Config::from_lookup(lookup(&[("JWT_SECRET", "x"), (name, value)])).unwrap_err();
            match err {
                ConfigError::Invalid { name: reported, value: shown } => {
                    assert_eq!(reported, name);
                    assert_eq!(shown, value);
                }
                other => panic!("{name}={value}: unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn range_edges_are_accepted() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "x"),
            ("ACCESS_TOKEN_MINUTES", "10080"),
            ("REFRESH_TOKEN_DAYS", "3650"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();
        assert_eq!(config.access_token_minutes, 10_080);
        assert_eq!(config.refresh_token_days, 3_650);
        assert_eq!(config.bcrypt_cost, 4);
    }
}
