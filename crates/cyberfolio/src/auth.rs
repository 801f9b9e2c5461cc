//! Credential checks for the terminal and the admin gate.
//!
//! Callers only see [`CredentialVerifier::verify`]; the shipped verifier
//! compares BLAKE3 digests so the plaintext secret never sits in config.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

/// Checks a presented secret.
pub trait CredentialVerifier: Send + Sync + fmt::Debug {
    /// Whether `secret` is the expected credential.
    fn verify(&self, secret: &str) -> bool;
}

/// Shared verifier.
pub type SharedVerifier = Arc<dyn CredentialVerifier>;

/// Hex BLAKE3 digest of a secret, in the form `auth.secret_hash` expects.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    blake3::hash(secret.as_bytes()).to_hex().to_string()
}

/// Verifies secrets against a stored BLAKE3 digest.
#[derive(Debug, Clone)]
pub struct Blake3Verifier {
    expected: Option<blake3::Hash>,
}

impl Blake3Verifier {
    /// Create a verifier from a hex digest.
    ///
    /// An unparsable digest yields a verifier that rejects everything.
    #[must_use]
    pub fn from_hex(hex: &str) -> Self {
        let expected = blake3::Hash::from_hex(hex.trim()).ok();
        if expected.is_none() {
            warn!("Secret hash is not valid hex, all credentials will be rejected");
        }
        Self { expected }
    }

    /// Create a verifier for a plaintext secret.
    #[must_use]
    pub fn for_secret(secret: &str) -> Self {
        Self {
            expected: Some(blake3::hash(secret.as_bytes())),
        }
    }
}

impl CredentialVerifier for Blake3Verifier {
    fn verify(&self, secret: &str) -> bool {
        // blake3::Hash equality is constant-time
        self.expected
            .is_some_and(|expected| blake3::hash(secret.as_bytes()) == expected)
    }
}

/// Result of one attempt at an [`AuthGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAttempt {
    /// The secret matched.
    Granted,
    /// The secret did not match; `remaining` attempts are left.
    Denied {
        /// Attempts left before lockout.
        remaining: u32,
    },
    /// Too many failures; the gate no longer evaluates secrets.
    LockedOut,
}

/// A password gate with a failure budget.
#[derive(Debug, Clone)]
pub struct AuthGate {
    verifier: SharedVerifier,
    max_attempts: u32,
    failures: u32,
    granted: bool,
}

impl AuthGate {
    /// Create a gate that locks after `max_attempts` failures.
    #[must_use]
    pub fn new(verifier: SharedVerifier, max_attempts: u32) -> Self {
        Self {
            verifier,
            max_attempts,
            failures: 0,
            granted: false,
        }
    }

    /// Present a secret.
    ///
    /// Once locked, secrets are not evaluated at all.
    pub fn attempt(&mut self, secret: &str) -> AuthAttempt {
        if self.is_locked() {
            return AuthAttempt::LockedOut;
        }

        if self.verifier.verify(secret) {
            info!("Authentication granted");
            self.failures = 0;
            self.granted = true;
            return AuthAttempt::Granted;
        }

        self.failures += 1;
        let remaining = self.remaining();
        warn!(failures = self.failures, remaining, "Authentication failed");
        if remaining == 0 {
            AuthAttempt::LockedOut
        } else {
            AuthAttempt::Denied { remaining }
        }
    }

    /// Whether the last attempt succeeded.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Whether the failure budget is spent.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.failures >= self.max_attempts
    }

    /// Attempts left before lockout.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.failures)
    }

    /// Drop a previous grant without touching the failure count.
    pub fn revoke(&mut self) {
        self.granted = false;
    }
}
