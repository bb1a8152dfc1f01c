//! Range identifiers of the form `range_<unix millis>_<random base-36>`.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

const ID_PREFIX: &str = "range";
const SUFFIX_LEN: usize = 9;

/// Generate a new range id.
///
/// Not a security token: uniqueness comes from the random suffix, the
/// timestamp only keeps ids roughly ordered by creation.
pub fn generate_range_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect();

    format!("{ID_PREFIX}_{millis}_{suffix}")
}

/// Check that a string has the `range_<digits>_<lowercase alnum>` shape
pub fn is_range_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("range_") else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };

    !millis.is_empty()
        && millis.chars().all(|c| c.is_ascii_digit())
        && !suffix.is_empty()
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_unique() {
        let id1 = generate_range_id();
        let id2 = generate_range_id();
        assert_ne!(id1, id2);
        assert!(is_range_id(&id1), "unexpected id shape: {id1}");
        assert!(is_range_id(&id2), "unexpected id shape: {id2}");
    }

    #[test]
    fn test_many_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_range_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_is_range_id() {
        assert!(is_range_id("range_1718000000000_k3j9x0a1b"));
        assert!(!is_range_id("demo_range_1"));
        assert!(!is_range_id("range__abc"));
        assert!(!is_range_id("range_123_ABC"));
        assert!(!is_range_id("range_123_"));
    }
}
