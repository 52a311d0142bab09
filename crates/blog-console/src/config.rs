use std::collections::BTreeMap;

use blog_firebase::{Endpoints, FirebaseConfig};
use serde::Deserialize;
use thiserror::Error;

/// Longest accepted refresh leeway. Id tokens live for an hour, so anything
/// near this already refreshes on every check.
pub const MAX_REFRESH_LEEWAY_SECS: u64 = 86_400;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// When set, every Firebase endpoint points at the local emulator suite.
    pub emulators: Option<EmulatorConfig>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct EmulatorConfig {
    pub auth_host: String,
    pub firestore_host: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// How often the refresher checks the session.
    pub refresh_check_secs: u64,
    /// Refresh once the id token expires within this many seconds.
    pub refresh_leeway_secs: u64,
    /// Forwarded to Google on sign-in, e.g. `prompt = "select_account"`.
    pub google_parameters: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_check_secs: 60,
            refresh_leeway_secs: 300,
            google_parameters: BTreeMap::new(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_check_secs == 0 {
            return Err("auth.refresh_check_secs must be at least 1".into());
        }
        if self.refresh_leeway_secs > MAX_REFRESH_LEEWAY_SECS {
            return Err(format!(
                "auth.refresh_leeway_secs must be at most {MAX_REFRESH_LEEWAY_SECS}"
            ));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config {path}: {message}")]
    Invalid { path: String, message: String },
}

pub fn parse(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

/// Applies the emulator override and checks the values the Firebase section
/// does not cover.
pub fn prepare(mut config: Config) -> Result<Config, String> {
    if let Some(emulators) = &config.emulators {
        config.firebase.endpoints =
            Endpoints::emulator(&emulators.auth_host, &emulators.firestore_host);
    }
    config.auth.validate()?;
    Ok(config)
}

/// The firebase section has no defaults, so a missing or unreadable file is an
/// error rather than a fallback.
pub fn load(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    let config = parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    prepare(config).map_err(|message| ConfigError::Invalid {
        path: path.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIREBASE_SECTION: &str = r#"
[firebase]
api_key = "key"
auth_domain = "quill-demo.firebaseapp.com"
project_id = "quill-demo"
storage_bucket = "quill-demo.appspot.com"
messaging_sender_id = "1234567890"
app_id = "1:1234567890:web:abcdef"
"#;

    #[test]
    fn server_and_auth_sections_default() {
        let config = parse(FIREBASE_SECTION).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.auth, AuthConfig::default());
        assert_eq!(config.firebase.project_id, "quill-demo");
        assert_eq!(
            config.firebase.endpoints.firestore,
            "https://firestore.googleapis.com/v1"
        );
    }

    #[test]
    fn reads_overrides() {
        let contents = format!(
            "[server]\nbind = \"127.0.0.1\"\nport = 8080\n\n[auth]\nrefresh_leeway_secs = 60\n{FIREBASE_SECTION}\n[firebase.endpoints]\nfirestore = \"http://127.0.0.1:8081/v1\"\n"
        );
        let config = parse(&contents).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.refresh_leeway_secs, 60);
        assert_eq!(config.auth.refresh_check_secs, 60);
        assert_eq!(config.firebase.endpoints.firestore, "http://127.0.0.1:8081/v1");
        assert_eq!(
            config.firebase.endpoints.identity_toolkit,
            "https://identitytoolkit.googleapis.com/v1"
        );
    }

    #[test]
    fn emulators_override_endpoints() {
        let contents = format!(
            "{FIREBASE_SECTION}\n[emulators]\nauth_host = \"127.0.0.1:9099\"\nfirestore_host = \"127.0.0.1:8080\"\n"
        );
        let config = prepare(parse(&contents).unwrap()).unwrap();
        assert_eq!(
            config.firebase.endpoints.secure_token,
            "http://127.0.0.1:9099/securetoken.googleapis.com/v1"
        );
        assert_eq!(config.firebase.endpoints.firestore, "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn reads_google_parameters() {
        let contents = format!(
            "[auth.google_parameters]\nprompt = \"select_account\"\n{FIREBASE_SECTION}"
        );
        let config = prepare(parse(&contents).unwrap()).unwrap();
        assert_eq!(
            config.auth.google_parameters.get("prompt").map(String::as_str),
            Some("select_account")
        );
    }

    #[test]
    fn rejects_out_of_range_refresh_settings() {
        let huge = format!("[auth]\nrefresh_leeway_secs = 9223372036854775807\n{FIREBASE_SECTION}");
        let err = prepare(parse(&huge).unwrap()).unwrap_err();
        assert!(err.contains("refresh_leeway_secs"));

        let zero = format!("[auth]\nrefresh_check_secs = 0\n{FIREBASE_SECTION}");
        let err = prepare(parse(&zero).unwrap()).unwrap_err();
        assert!(err.contains("refresh_check_secs"));

        assert!(prepare(parse(FIREBASE_SECTION).unwrap()).is_ok());
    }

    #[test]
    fn firebase_section_is_required() {
        assert!(parse("[server]\nbind = \"0.0.0.0\"\nport = 3000\n").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
