use serde::Deserialize;
use url::Url;

use crate::error::FirebaseError;

/// Web app configuration as issued by the Firebase console.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// REST base URLs. Overridable so the local emulators (or a test server) can
/// stand in for the hosted services.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub identity_toolkit: String,
    pub secure_token: String,
    pub firestore: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            identity_toolkit: "https://identitytoolkit.googleapis.com/v1".into(),
            secure_token: "https://securetoken.googleapis.com/v1".into(),
            firestore: "https://firestore.googleapis.com/v1".into(),
        }
    }
}

impl Endpoints {
    /// Point every service at one host, the way the emulator suite is laid out.
    pub fn emulator(authHost: &str, firestoreHost: &str) -> Self {
        Self {
            identity_toolkit: format!("http://{authHost}/identitytoolkit.googleapis.com/v1"),
            secure_token: format!("http://{authHost}/securetoken.googleapis.com/v1"),
            firestore: format!("http://{firestoreHost}/v1"),
        }
    }
}

impl FirebaseConfig {
    pub fn validate(&self) -> Result<(), FirebaseError> {
        let required = [
            ("api_key", &self.api_key),
            ("auth_domain", &self.auth_domain),
            ("project_id", &self.project_id),
            ("storage_bucket", &self.storage_bucket),
            ("messaging_sender_id", &self.messaging_sender_id),
            ("app_id", &self.app_id),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(FirebaseError::Config(format!("firebase.{key} is empty")));
            }
        }

        let endpoints = [
            ("identity_toolkit", &self.endpoints.identity_toolkit),
            ("secure_token", &self.endpoints.secure_token),
            ("firestore", &self.endpoints.firestore),
        ];
        for (key, value) in endpoints {
            Url::parse(value).map_err(|e| {
                FirebaseError::Config(format!("firebase.endpoints.{key} is not a valid url: {e}"))
            })?;
        }

        Ok(())
    }
}
