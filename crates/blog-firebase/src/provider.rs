use url::form_urlencoded;

pub const GOOGLE_PROVIDER_ID: &str = "google.com";

/// A credential minted by Google that Firebase exchanges for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdpCredential {
    IdToken(String),
    AccessToken(String),
}

/// Reusable descriptor for the Google identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GoogleAuthProvider {
    custom_parameters: Vec<(String, String)>,
}

impl GoogleAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider_id(&self) -> &'static str {
        GOOGLE_PROVIDER_ID
    }

    /// Extra parameters forwarded to the provider, e.g. `prompt=select_account`.
    pub fn set_custom_parameter(&mut self, key: &str, value: &str) -> &mut Self {
        self.custom_parameters.retain(|(k, _)| k != key);
        self.custom_parameters.push((key.to_string(), value.to_string()));
        self
    }

    /// Form encoded `postBody` for `accounts:signInWithIdp`.
    pub fn post_body(&self, credential: &IdpCredential) -> String {
        let mut body = form_urlencoded::Serializer::new(String::new());
        match credential {
            IdpCredential::IdToken(token) => body.append_pair("id_token", token),
            IdpCredential::AccessToken(token) => body.append_pair("access_token", token),
        };
        body.append_pair("providerId", GOOGLE_PROVIDER_ID);
        for (key, value) in &self.custom_parameters {
            body.append_pair(key, value);
        }
        body.finish()
    }

    /// Redirect handler hosted on the project's auth domain.
    pub fn request_uri(&self, authDomain: &str) -> String {
        format!("https://{authDomain}/__/auth/handler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_body_encodes_id_token() {
        let provider = GoogleAuthProvider::new();
        let body = provider.post_body(&IdpCredential::IdToken("abc.def+ghi".into()));
        assert_eq!(body, "id_token=abc.def%2Bghi&providerId=google.com");
    }

    #[test]
    fn post_body_carries_custom_parameters() {
        let mut provider = GoogleAuthProvider::new();
        provider
            .set_custom_parameter("prompt", "consent")
            .set_custom_parameter("prompt", "select_account");
        let body = provider.post_body(&IdpCredential::AccessToken("tok".into()));
        assert_eq!(
            body,
            "access_token=tok&providerId=google.com&prompt=select_account"
        );
    }

    #[test]
    fn request_uri_uses_auth_domain() {
        let provider = GoogleAuthProvider::new();
        assert_eq!(
            provider.request_uri("quill-demo.firebaseapp.com"),
            "https://quill-demo.firebaseapp.com/__/auth/handler"
        );
    }
}
