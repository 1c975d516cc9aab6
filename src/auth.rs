use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Password handed to the result logger. Debug output never shows it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// An empty password means the user chose not to log results.
    pub fn from_input(input: &str) -> Option<Self> {
        if input.is_empty() {
            None
        } else {
            Some(Self::new(input))
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Shared-secret check deciding whether results may be logged
#[derive(Debug, Clone)]
pub struct SharedSecretGate {
    secret: String,
    password_hash: String,
}

impl SharedSecretGate {
    pub fn new(secret: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Hex HMAC-SHA256 of `password`, keyed by `secret`
    pub fn hash(secret: &str, password: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC takes keys of any length");
        mac.update(password.as_bytes());
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    pub fn verify(&self, credential: &Credential) -> bool {
        Self::hash(&self.secret, credential.expose()) == self.password_hash
    }

    /// Pass the credential through only if it checks out.
    pub fn admit(&self, credential: Option<Credential>) -> Option<Credential> {
        let credential = credential?;
        if self.verify(&credential) {
            Some(credential)
        } else {
            log::warn!("password rejected, results will not be logged");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_hex_hmac_sha256() {
        assert_eq!(
            SharedSecretGate::hash("key", "The quick brown fox jumps over the lazy dog"),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn hashes_made_elsewhere_still_verify() {
        // HMAC of "password" under the built-in secret, computed outside this crate
        let gate = SharedSecretGate::new(
            "local-dev-secret",
            "e8a6e53075fe24683a7f42b731ed885efe87248b31c49a0e4759ec304b62b9e2",
        );
        assert!(gate.verify(&Credential::new("password")));
        assert!(!gate.verify(&Credential::new("local-dev-secret")));
    }

    #[test]
    fn verifies_matching_password() {
        let gate = SharedSecretGate::new("s3cret", SharedSecretGate::hash("s3cret", "password"));
        assert!(gate.verify(&Credential::new("password")));
        assert!(!gate.verify(&Credential::new("Password")));
    }

    #[test]
    fn secret_changes_the_hash() {
        assert_ne!(
            SharedSecretGate::hash("a", "password"),
            SharedSecretGate::hash("b", "password")
        );
    }

    #[test]
    fn admit_filters_credentials() {
        let gate = SharedSecretGate::new("k", SharedSecretGate::hash("k", "pw"));
        assert_eq!(
            gate.admit(Some(Credential::new("pw"))),
            Some(Credential::new("pw"))
        );
        assert_eq!(gate.admit(Some(Credential::new("nope"))), None);
        assert_eq!(gate.admit(None), None);
    }

    #[test]
    fn empty_input_means_no_credential() {
        assert_eq!(Credential::from_input(""), None);
        assert!(Credential::from_input("x").is_some());
    }

    #[test]
    fn debug_hides_password() {
        assert_eq!(
            format!("{:?}", Credential::new("hunter2")),
            "Credential(***)"
        );
    }
}
