//! Bearer credential attached to gateway calls

use std::fmt;

/// Opaque bearer token supplied by the session/auth collaborator
///
/// The gateway only forwards it; `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::bearer("secret-token");
        assert_eq!(credential.token(), "secret-token");
        assert!(!format!("{:?}", credential).contains("secret"));
    }
}
