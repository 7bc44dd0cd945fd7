use crate::protocol::AuthToken;

/// Bearer credentials for the remote services.
///
/// The session is created at the program boundary and handed to whatever
/// talks to the API; nothing reads the token from ambient storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            return Self::anonymous();
        }
        Self { token: Some(token) }
    }

    pub fn from_auth_token(token: &AuthToken) -> Self {
        Self::with_token(token.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value for the `Authorization` header, if any.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Drops the token after the service rejected it.
    pub fn invalidate(&mut self) {
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let session = Session::with_token("abc");
        assert!(session.is_authenticated());
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        assert_eq!(Session::with_token("  "), Session::anonymous());
    }

    #[test]
    fn test_invalidate() {
        let mut session = Session::from_auth_token(&AuthToken {
            access_token: "xyz".into(),
            token_type: "bearer".into(),
        });
        session.invalidate();
        assert!(!session.is_authenticated());
        assert!(session.bearer().is_none());
    }
}
