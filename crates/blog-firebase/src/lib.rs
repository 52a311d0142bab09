#![allow(non_snake_case)]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod firestore;
pub mod observer;
pub mod provider;
pub mod refresh;
pub mod value;

pub use app::{FirebaseApp, Services};
pub use auth::{AuthClient, AuthListener, AuthStateSource, Credentials, Session, Subscription};
pub use config::{Endpoints, FirebaseConfig};
pub use error::FirebaseError;
pub use firestore::Firestore;
pub use observer::{transition_message, AuthObserver, AuthState};
pub use provider::{GoogleAuthProvider, IdpCredential};
pub use refresh::spawn_token_refresher;
