//! Attribute-bag filtering
//!
//! Narrows a submitted JSON object to an allow-list of keys so a request body can't
//! assign fields the endpoint doesn't own.

use serde_json::{Map, Value};

/// Keep only the entries of `bag` whose key appears in `allowed`, values untouched
pub fn filter_fields(bag: &Map<String, Value>, allowed: &[&str]) -> Map<String, Value> {
    bag.iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// True if any of `keys` is present with a non-null value
pub fn contains_any(bag: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| bag.get(*key).is_some_and(|value| !value.is_null()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_keeps_exact_intersection() {
        let input = bag(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin",
            "admin": true
        }));

        let filtered = filter_fields(&input, &["name", "email"]);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered["name"], json!("Ada"));
        assert_eq!(filtered["email"], json!("ada@example.com"));
        assert!(!filtered.contains_key("admin"));
    }

    #[test]
    fn test_values_are_not_coerced() {
        let input = bag(json!({ "name": { "first": "Ada" }, "email": null }));

        let filtered = filter_fields(&input, &["name", "email"]);

        assert_eq!(filtered["name"], json!({ "first": "Ada" }));
        assert_eq!(filtered["email"], Value::Null);
    }

    #[test]
    fn test_allowed_key_missing_from_bag() {
        let input = bag(json!({ "name": "Ada" }));
        let filtered = filter_fields(&input, &["name", "email"]);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_empty_allow_list_drops_everything() {
        let input = bag(json!({ "name": "Ada", "email": "ada@example.com" }));
        assert!(filter_fields(&input, &[]).is_empty());
    }

    #[test]
    fn test_contains_any_ignores_null() {
        let input = bag(json!({ "password": null, "name": "Ada" }));
        assert!(!contains_any(&input, &["password", "passwordConfirm"]));

        let input = bag(json!({ "passwordConfirm": "x" }));
        assert!(contains_any(&input, &["password", "passwordConfirm"]));
    }
}
