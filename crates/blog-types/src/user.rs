use serde::{Deserialize, Serialize};

/// Public view of a signed-in principal. Carries no credentials, so it is safe
/// to hand to the browser.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl AuthUser {
    /// Best human readable name: display name, then email, then uid.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub id_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_display_name_then_email() {
        let mut user = AuthUser {
            uid: "u1".into(),
            email: Some("a@b.com".into()),
            display_name: Some("Ada".into()),
            photo_url: None,
        };
        assert_eq!(user.label(), "Ada");

        user.display_name = None;
        assert_eq!(user.label(), "a@b.com");

        user.email = None;
        assert_eq!(user.label(), "u1");
    }
}
