// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable identifiers using Crockford Base32 encoding.
//! Users get short prefixed IDs (`U_K7NP3X`), payments get longer
//! references (`AGA_8MWQT2K7NP3XY2ZD`) that are handed to donors as receipts.
//!
//! The alphabet excludes I, L, O, U so references survive being read aloud.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
pub const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Number of random characters in a payment reference
pub const PAYMENT_REFERENCE_LEN: usize = 16;

/// Number of random characters in an OAuth `state` value
pub const OAUTH_STATE_LEN: usize = 26;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User account (U_)
    User,
    /// Payment reference (AGA_)
    Payment,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Payment => "AGA",
        }
    }

    fn random_len(&self) -> usize {
        match self {
            EntityPrefix::User => 6,
            EntityPrefix::Payment => PAYMENT_REFERENCE_LEN,
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID, e.g. `U_K7NP3X`
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!(
        "{}_{}",
        prefix.as_str(),
        generate_crockford_string(prefix.random_len())
    )
}

/// Generate a raw Crockford Base32 string without prefix
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a payment reference (AGA_ + 16 chars)
pub fn generate_payment_reference() -> String {
    generate_id(EntityPrefix::Payment)
}

/// Generate an unguessable OAuth `state` parameter
pub fn generate_oauth_state() -> String {
    generate_raw_id(OAUTH_STATE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_user_id_format() {
        let user_id = generate_user_id();
        assert!(user_id.starts_with("U_"));
        assert_eq!(user_id.len(), 8);
    }

    #[test]
    fn test_payment_reference_format() {
        let reference = generate_payment_reference();
        assert!(reference.starts_with("AGA_"));
        assert_eq!(reference.len(), 4 + PAYMENT_REFERENCE_LEN);

        for c in reference[4..].chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }
    }

    #[test]
    fn test_reference_uniqueness() {
        let mut refs = HashSet::new();
        for _ in 0..1000 {
            assert!(refs.insert(generate_payment_reference()), "Duplicate reference");
        }
    }

    #[test]
    fn test_oauth_state() {
        let state = generate_oauth_state();
        assert_eq!(state.len(), OAUTH_STATE_LEN);
        assert!(!state.contains('_'));
        assert_ne!(state, generate_oauth_state());
    }
}
