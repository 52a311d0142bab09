use std::time::Duration;

use crate::auth::AuthClient;
use crate::config::FirebaseConfig;
use crate::error::FirebaseError;
use crate::firestore::Firestore;
use crate::provider::GoogleAuthProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The long-lived handles built from one configuration record. Each handle is
/// a cheap clone over shared state.
#[derive(Clone)]
pub struct Services {
    pub options: FirebaseConfig,
    pub auth: AuthClient,
    pub db: Firestore,
    pub google_provider: GoogleAuthProvider,
}

pub struct FirebaseApp;

impl FirebaseApp {
    /// Validates `config` and builds the service handles over one shared HTTP
    /// client. Nothing is contacted yet.
    pub fn initialize(config: FirebaseConfig) -> Result<Services, FirebaseError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("quill-blog/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let auth = AuthClient::new(http.clone(), &config);
        let db = Firestore::new(http, &config);

        tracing::info!(
            "firebase initialized for project {} (auth domain {})",
            config.project_id,
            config.auth_domain
        );

        Ok(Services {
            options: config,
            auth,
            db,
            google_provider: GoogleAuthProvider::new(),
        })
    }
}
