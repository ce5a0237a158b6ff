use rand::Rng;

/// Default number of digits after the prefix (`FGD00`..`FGD99`).
pub const DEFAULT_DIGITS: u32 = 2;

/// Re-draws allowed when the store reports an identifier collision.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 32;

/// Produces public resource codes: a fixed prefix followed by a zero-padded
/// number drawn uniformly from `0..10^digits`.
///
/// Draws are independent of what is already stored, so collisions are
/// expected once the space fills up. Codes are unique per table, not per
/// owner: with the default two digits a table holds at most 100 records
/// across all users, after which every create fails until rows are deleted
/// or `digits` is raised. The collection retries on a collision
/// reported by the store, up to `max_attempts` draws.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierAllocator {
    digits: u32,
    max_attempts: u32,
}

impl IdentifierAllocator {
    /// `digits` is clamped to `1..=9` so the space fits a `u32`.
    pub fn new(digits: u32, max_attempts: u32) -> Self {
        Self {
            digits: digits.clamp(1, 9),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Number of distinct codes per prefix.
    pub fn space(&self) -> u32 {
        10u32.pow(self.digits)
    }

    pub fn allocate(&self, prefix: &str) -> String {
        let number = rand::rng().random_range(0..self.space());
        format!("{prefix}{number:0width$}", width = self.digits as usize)
    }
}

impl Default for IdentifierAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_DIGITS, DEFAULT_MAX_ATTEMPTS)
    }
}
