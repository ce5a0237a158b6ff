use std::fmt;

use factguard_db::identifier::{DEFAULT_DIGITS, DEFAULT_MAX_ATTEMPTS};

/// Argon2id memory cost (KiB) and pass count. The defaults are the argon2
/// crate's own, which sit in the same cost range as bcrypt work factor 10.
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19 * 1024;
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;

/// Everything the API layer needs from configuration. Built once at startup
/// and moved into the shared state.
#[derive(Clone)]
pub struct Settings {
    pub jwt_secret: String,
    /// Accounts signing up with one of these emails get the admin role.
    pub admin_emails: Vec<String>,
    pub identifier_digits: u32,
    pub identifier_attempts: u32,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

impl Settings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            admin_emails: Vec::new(),
            identifier_digits: DEFAULT_DIGITS,
            identifier_attempts: DEFAULT_MAX_ATTEMPTS,
            hash_memory_kib: DEFAULT_HASH_MEMORY_KIB,
            hash_iterations: DEFAULT_HASH_ITERATIONS,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("jwt_secret", &"<redacted>")
            .field("admin_emails", &self.admin_emails)
            .field("identifier_digits", &self.identifier_digits)
            .field("identifier_attempts", &self.identifier_attempts)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .finish()
    }
}
