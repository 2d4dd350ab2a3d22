use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub store: Store,
    pub cleanup: Cleanup,
    pub http: Http,
    pub log: Log,
}

impl Settings {
    /// Rejects values that would only surface later as failing requests.
    pub fn validate(&self) -> Result<()> {
        if self.auth.access_ttl_secs == 0 {
            return Err(anyhow!("auth.access_ttl_secs must be greater than 0"));
        }
        if self.auth.refresh_ttl_secs == 0 {
            return Err(anyhow!("auth.refresh_ttl_secs must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct Auth {
    #[serde(default)]
    pub secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

// Keeps the signing secret out of `info!(?settings)`.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

impl Auth {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "mysql"
    #[serde(default)]
    pub dsn: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

impl Store {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_op_timeout_ms() -> u64 {
    3_000
}

#[derive(Debug, Deserialize)]
pub struct Cleanup {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Cleanup {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Overrides use `TOKENKEEPER__<SECTION>__<KEY>`, e.g.
/// `TOKENKEEPER__STORE__DSN`.
const ENV_PREFIX: &str = "TOKENKEEPER";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let mut settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    if let Ok(key) = std::env::var("JWT_SIGNING_KEY") {
        settings.auth.secret = key;
    }

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_settings(body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("tokenkeeper-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_all_sections() {
        let path = write_settings(
            r#"
[auth]
secret = "s3cret"
access_ttl_secs = 1800
refresh_ttl_secs = 1209600

[store]
backend = "memory"

[cleanup]
enabled = true
interval_secs = 86400

[http]
address = "127.0.0.1:8080"

[log]
filter = "info"
"#,
        );

        let settings = parse_settings(path.to_str()).unwrap();
        assert_eq!(settings.auth.access_ttl(), Duration::from_secs(1800));
        assert_eq!(settings.auth.refresh_ttl(), Duration::from_secs(14 * 24 * 3600));
        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.store.op_timeout(), Duration::from_secs(3));
        assert_eq!(settings.cleanup.interval(), Duration::from_secs(86400));
        assert!(settings.http.cert_path.is_none());
        assert!(!format!("{:?}", settings.auth).contains("s3cret"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn zero_ttl_is_refused() {
        let path = write_settings(
            r#"
[auth]
access_ttl_secs = 0
refresh_ttl_secs = 1209600

[store]
backend = "memory"

[cleanup]
enabled = false
interval_secs = 60

[http]
address = "127.0.0.1:8080"

[log]
filter = "info"
"#,
        );

        let err = parse_settings(path.to_str()).unwrap_err();
        assert!(err.to_string().contains("access_ttl_secs"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("")).is_err());
    }
}
