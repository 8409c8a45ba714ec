use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub oidc_issuer_url: String,
    pub storage_root: PathBuf,
    pub public_url: String,
    pub mail_from: String,
    pub admin_email: String,
    pub admin_subjects: Vec<String>,
    pub run_migrations: bool,
}

impl Config {
    /// Loads `.env` when present, then reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let bind_addr = match var("BIND_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "BIND_ADDR", value })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let run_migrations = match var("RUN_MIGRATIONS").as_deref() {
            None | Some("0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "RUN_MIGRATIONS",
                    value: other.to_owned(),
                });
            }
        };

        let admin_subjects = var("ADMIN_SUBJECTS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|subject| !subject.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr,
            oidc_issuer_url: required("OIDC_ISSUER_URL")?,
            storage_root: var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./storage")),
            public_url: var("PUBLIC_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_owned())
                .trim_end_matches('/')
                .to_owned(),
            mail_from: var("MAIL_FROM").unwrap_or_else(|| "no-reply@localhost".to_owned()),
            admin_email: required("ADMIN_EMAIL")?,
            admin_subjects,
            run_migrations,
        })
    }

    pub fn is_admin_subject(&self, subject: &str) -> bool {
        self.admin_subjects.iter().any(|admin| admin == subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/centre"),
        ("OIDC_ISSUER_URL", "https://auth.univ.test"),
        ("ADMIN_EMAIL", "centre@univ.test"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.storage_root, PathBuf::from("./storage"));
        assert_eq!(config.public_url, "http://localhost:3000");
        assert_eq!(config.mail_from, "no-reply@localhost");
        assert!(config.admin_subjects.is_empty());
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_missing_required_variable() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ADMIN_EMAIL")));
    }

    #[test]
    fn test_overrides_and_admin_subjects() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("PUBLIC_URL", "https://centre.univ.test/"),
            ("ADMIN_SUBJECTS", "sub-1, sub-2,,"),
            ("RUN_MIGRATIONS", "true"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.public_url, "https://centre.univ.test");
        assert_eq!(config.admin_subjects, ["sub-1", "sub-2"]);
        assert!(config.is_admin_subject("sub-2"));
        assert!(!config.is_admin_subject("sub-3"));
        assert!(config.run_migrations);
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("BIND_ADDR", "not-an-address"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RUN_MIGRATIONS", "maybe"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "RUN_MIGRATIONS", .. })
        ));
    }
}
