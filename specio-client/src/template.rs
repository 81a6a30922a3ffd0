//! Path templates with `{name}` placeholders.

use std::fmt::Display;

/// Ordered name/value pairs used for path parameters and query strings.
///
/// Values are stored in their string form; numbers and other
/// [`Display`] values are stringified on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair. Duplicate names are kept, as query strings allow them.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.0.push((name.into(), value.to_string()));
    }

    /// Builder-style [`Params::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append every pair of `other`.
    pub fn extend(&mut self, other: Params) {
        self.0.extend(other.0);
    }

    /// Build from the members of a JSON object.
    ///
    /// String members are used verbatim, everything else in its JSON text
    /// form. Anything other than an object yields no pairs.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::new();
        };
        object
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k.clone(), s.clone()),
                other => (k.clone(), other.to_string()),
            })
            .collect()
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Display, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Display> From<Vec<(K, V)>> for Params {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<&serde_json::Value> for Params {
    fn from(value: &serde_json::Value) -> Self {
        Self::from_json(value)
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Replace every `{name}` in `template` with the matching parameter value.
///
/// Values are inserted as-is, without percent-encoding. Placeholders with no
/// matching parameter stay in the output verbatim, and parameters that match
/// no placeholder are ignored.
pub fn resolve(template: &str, params: &Params) -> String {
    params.iter().fold(template.to_string(), |url, (name, value)| {
        url.replace(&format!("{{{name}}}"), value)
    })
}

/// Names of the placeholders in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !name.contains('{') {
                    names.push(name);
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_single_placeholder() {
        let params = Params::from([("id", "bar")]);
        assert_eq!(resolve("/foo/{id}", &params), "/foo/bar");
    }

    #[test]
    fn test_resolve_numbers_are_stringified() {
        let params = Params::from([("foo-id", 1), ("bar-id", 2)]);
        assert_eq!(
            resolve("/foo/{foo-id}/bar/{bar-id}", &params),
            "/foo/1/bar/2"
        );
    }

    #[test]
    fn test_resolve_replaces_every_occurrence() {
        let params = Params::from([("id", 7)]);
        assert_eq!(resolve("/{id}/copy/{id}", &params), "/7/copy/7");
    }

    #[test]
    fn test_unmatched_placeholder_is_left_alone() {
        let params = Params::from([("id", "bar")]);
        assert_eq!(
            resolve("/foo/{id}/items/{itemId}", &params),
            "/foo/bar/items/{itemId}"
        );
    }

    #[test]
    fn test_extra_params_are_ignored() {
        let params = Params::from([("unused", "x")]);
        assert_eq!(resolve("/foo", &params), "/foo");
    }

    #[test]
    fn test_values_are_not_encoded() {
        let params = Params::from([("q", "a b/c")]);
        assert_eq!(resolve("/search/{q}", &params), "/search/a b/c");
    }

    #[test]
    fn test_resolved_output_has_no_supplied_tokens() {
        let templates = [
            "/a/{x}",
            "/{x}/{y}/{z}",
            "/{y}/static/{x}/{y}",
            "/no/tokens",
            "/{z}",
        ];
        let params = Params::from([("x", "1"), ("y", "two")]);

        for template in templates {
            let resolved = resolve(template, &params);
            for (name, _) in params.iter() {
                assert!(!resolved.contains(&format!("{{{name}}}")));
            }
            let remaining: Vec<_> = placeholders(&resolved);
            let expected: Vec<_> = placeholders(template)
                .into_iter()
                .filter(|name| !params.contains(name))
                .collect();
            assert_eq!(remaining, expected);
        }
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("/pet/{petId}/uploadImage/{fileId}"),
            vec!["petId", "fileId"]
        );
        assert!(placeholders("/pet").is_empty());
        assert!(placeholders("/broken/{").is_empty());
    }

    #[test]
    fn test_params_from_json() {
        let params = Params::from_json(&json!({ "id": "foo", "page": 2, "all": true }));
        assert_eq!(params.get("id"), Some("foo"));
        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.get("all"), Some("true"));

        assert!(Params::from_json(&json!(["id"])).is_empty());
    }

    #[test]
    fn test_params_keep_duplicates() {
        let params = Params::new().with("tag", "a").with("tag", "b");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("tag"), Some("a"));
    }
}
