use uuid::Uuid;

/// Prefix carried by every app API key.
pub const API_KEY_PREFIX: &str = "sk_";

/// Generates an opaque API key for an app.
///
/// Keys are regenerable: calling this again for the same app simply
/// replaces the stored key, invalidating the old one.
pub fn generate_api_key() -> String {
    format!(
        "{}{}{}",
        API_KEY_PREFIX,
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_has_prefix_and_length() {
        let key = generate_api_key();
        assert!(key.starts_with(API_KEY_PREFIX));
        // two 32-char simple uuids after the prefix
        assert_eq!(key.len(), API_KEY_PREFIX.len() + 64);
    }

    #[test]
    fn generated_keys_are_unique() {
        assert_ne!(generate_api_key(), generate_api_key());
    }
}
