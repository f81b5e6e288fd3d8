//! Stable identifiers derived from citation text.
//!
//! Both the result id and the cache key hash the *raw* citation text with
//! blake3, so the same text always maps to the same entry regardless of
//! which process validated it.

/// Prefix for citation result ids.
pub const PREFIX_CITATION: &str = "cit";

/// Number of hex characters kept in a citation id.
const ID_HEX_LEN: usize = 16;

/// Full blake3 hex digest of the raw citation text. Used as the cache key.
#[must_use]
pub fn cache_key(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Short prefixed id for a citation, e.g. `cit-3f9a0c11d2e4b5a6`.
#[must_use]
pub fn citation_id(text: &str) -> String {
    let hex = blake3::hash(text.as_bytes()).to_hex();
    format!("{PREFIX_CITATION}-{}", &hex[..ID_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable() {
        assert_eq!(cache_key("Smith J. (2020)."), cache_key("Smith J. (2020)."));
        assert_ne!(cache_key("Smith J. (2020)."), cache_key("Smith J. (2021)."));
        assert_eq!(cache_key("").len(), 64);
    }

    #[test]
    fn citation_id_format() {
        let id = citation_id("Jones B. (2021). Vaccine efficacy.");
        assert!(id.starts_with("cit-"), "id should be prefixed: {id}");
        assert_eq!(id.len(), 4 + ID_HEX_LEN);
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn citation_id_is_prefix_of_cache_key() {
        let text = "arXiv:2301.12345";
        assert!(cache_key(text).starts_with(&citation_id(text)[4..]));
    }
}
