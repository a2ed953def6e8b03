//! Query construction.
//!
//! The remote API takes bracket-style nested query keys: a nested params
//! object `{"page": {"offset": 0, "limit": 10}}` serializes to
//! `page[offset]=0&page[limit]=10`, and arrays join with commas. This module
//! provides both directions:
//!
//! - [`build_url`] flattens a nested params object onto an endpoint
//! - [`expand_bracket_keys`] turns bracket-style keys (`a[b][c]`) into nested
//!   objects, used by the filtering aggregate before serialization

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Appends the serialized params to the endpoint.
///
/// Params must be a JSON object; nested objects become bracket-style keys and
/// arrays comma-joined values. An empty params object returns the endpoint
/// unchanged. The query string is percent-encoded.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use chronicle::query::build_url;
///
/// let url = build_url("/api/runs", &json!({
///     "page": { "offset": 0, "limit": 10 },
///     "filter": { "names": "run1,run2" },
/// }));
/// assert_eq!(url, "/api/runs?page%5Boffset%5D=0&page%5Blimit%5D=10&filter%5Bnames%5D=run1%2Crun2");
/// ```
pub fn build_url(endpoint: &str, params: &Value) -> String {
    let mut pairs = Vec::new();
    if let Value::Object(map) = params {
        for (key, value) in map {
            collect_pairs(&mut pairs, key.clone(), value);
        }
    }

    if pairs.is_empty() {
        return endpoint.to_string();
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    let query = serializer.finish();

    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}{query}")
}

/// Flattens one value under the given bracket-style key prefix.
fn collect_pairs(pairs: &mut Vec<(String, String)>, prefix: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, nested) in map {
                collect_pairs(pairs, format!("{prefix}[{key}]"), nested);
            }
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push((prefix, joined));
        }
        scalar => pairs.push((prefix, scalar_to_string(scalar))),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Expands bracket-style keys of a flat object into nested objects.
///
/// `{"a[b][c]": 1, "a[b][d]": 2, "x": 3}` becomes
/// `{"a": {"b": {"c": 1, "d": 2}}, "x": 3}`. Sibling keys sharing a prefix
/// deep-merge; a scalar colliding with an object is replaced by the later
/// entry.
pub fn expand_bracket_keys(flat: &Map<String, Value>) -> Value {
    let mut root = Map::new();
    for (key, value) in flat {
        let segments = split_bracket_key(key);
        insert_nested(&mut root, &segments, value.clone());
    }
    Value::Object(root)
}

/// Splits `a[b][c]` into `["a", "b", "c"]`; keys without brackets stay whole.
fn split_bracket_key(key: &str) -> Vec<&str> {
    match key.find('[') {
        None => vec![key],
        Some(first) => {
            let mut segments = vec![&key[..first]];
            for part in key[first..].split('[').skip(1) {
                segments.push(part.trim_end_matches(']'));
            }
            segments
        }
    }
}

fn insert_nested(target: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let (head, rest) = match segments {
        [] => return,
        [head, rest @ ..] => (*head, rest),
    };

    if rest.is_empty() {
        target.insert(head.to_string(), value);
        return;
    }

    let entry = target
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(nested) = entry {
        insert_nested(nested, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url_flat_params() {
        let url = build_url("/api/tags", &json!({ "mineOnly": true, "page": 2 }));
        assert_eq!(url, "/api/tags?mineOnly=true&page=2");
    }

    #[test]
    fn test_build_url_nested_params() {
        let url = build_url("/api/runs", &json!({ "page": { "offset": 20, "limit": 10 } }));
        assert_eq!(url, "/api/runs?page%5Boffset%5D=20&page%5Blimit%5D=10");
    }

    #[test]
    fn test_build_url_array_joins_with_commas() {
        let url = build_url("/api/runs", &json!({ "filter": { "definitions": ["PHYSICS", "COSMICS"] } }));
        assert_eq!(url, "/api/runs?filter%5Bdefinitions%5D=PHYSICS%2CCOSMICS");
    }

    #[test]
    fn test_build_url_empty_params() {
        assert_eq!(build_url("/api/runs", &json!({})), "/api/runs");
    }

    #[test]
    fn test_build_url_appends_to_existing_query() {
        let url = build_url("/api/runs?token=abc", &json!({ "page": 1 }));
        assert_eq!(url, "/api/runs?token=abc&page=1");
    }

    #[test]
    fn test_build_url_skips_null() {
        let url = build_url("/api/runs", &json!({ "a": null, "b": 1 }));
        assert_eq!(url, "/api/runs?b=1");
    }

    #[test]
    fn test_expand_plain_keys() {
        let mut flat = Map::new();
        flat.insert("names".to_string(), json!("run1,run2"));
        assert_eq!(expand_bracket_keys(&flat), json!({ "names": "run1,run2" }));
    }

    #[test]
    fn test_expand_nested_keys_merge() {
        let mut flat = Map::new();
        flat.insert("a[b][c]".to_string(), json!(1));
        flat.insert("a[b][d]".to_string(), json!(2));
        flat.insert("x".to_string(), json!(3));
        assert_eq!(
            expand_bracket_keys(&flat),
            json!({ "a": { "b": { "c": 1, "d": 2 } }, "x": 3 })
        );
    }

    #[test]
    fn test_expand_round_trips_through_build_url() {
        let mut flat = Map::new();
        flat.insert("filter[tags][values]".to_string(), json!(["A", "B"]));
        flat.insert("filter[tags][operation]".to_string(), json!("and"));
        let expanded = expand_bracket_keys(&flat);

        let url = build_url("/api/runs", &expanded);
        assert_eq!(
            url,
            "/api/runs?filter%5Btags%5D%5Bvalues%5D=A%2CB&filter%5Btags%5D%5Boperation%5D=and"
        );
    }
}
