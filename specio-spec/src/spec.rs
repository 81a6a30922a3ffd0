//! Swagger 2.0 specification types

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scheme used when a document lists none.
pub const DEFAULT_SCHEME: &str = "http";

/// Host used when a document does not declare one.
pub const DEFAULT_HOST: &str = "localhost";

/// Base path used when a document does not declare one.
pub const DEFAULT_BASE_PATH: &str = "/";

/// Swagger 2.0 specification document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub schemes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    #[serde(
        skip_serializing_if = "IndexMap::is_empty",
        default,
        deserialize_with = "lenient_definitions"
    )]
    pub security_definitions: IndexMap<String, SecurityDefinition>,
}

impl Specification {
    /// Active scheme: the first listed, or `http`.
    pub fn scheme(&self) -> &str {
        self.schemes
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_SCHEME)
    }

    /// Declared host, or `localhost`.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Declared base path, or `/`.
    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH)
    }

    /// Look up a security definition by scheme name.
    pub fn security_definition(&self, name: &str) -> Option<&SecurityDefinition> {
        self.security_definitions.get(name)
    }

    /// Every declared operation as `(path, method, operation)`.
    ///
    /// Paths are visited in document order; methods within a path follow
    /// [`HttpMethod::ALL`].
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &OperationSpec)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations()
                .map(move |(method, operation)| (path.as_str(), method, operation))
        })
    }
}

/// API information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// HTTP methods an operation may be declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Head,
    Options,
    Delete,
    Get,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    /// All recognized methods, in the order operations are bound.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Delete,
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
    ];

    /// Lowercase name as used for path item keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Delete => "delete",
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
        }
    }

    /// Whether requests with this method carry a payload.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// Parse a method name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Path item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<OperationSpec>,
}

impl PathItem {
    /// Operation declared under `method`, if any.
    pub fn operation(&self, method: HttpMethod) -> Option<&OperationSpec> {
        match method {
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    /// Mutable slot for the operation under `method`.
    pub fn operation_mut(&mut self, method: HttpMethod) -> &mut Option<OperationSpec> {
        match method {
            HttpMethod::Head => &mut self.head,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
        }
    }

    /// Declared operations in binding order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &OperationSpec)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

/// Security requirement: scheme name to scopes, in declaration order.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Operation (endpoint)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub security: Vec<SecurityRequirement>,
}

impl OperationSpec {
    /// Operation id, treating an empty string as absent.
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Name of the first security scheme of the first requirement.
    pub fn security_scheme_name(&self) -> Option<&str> {
        self.security
            .first()
            .and_then(|requirement| requirement.keys().next())
            .map(String::as_str)
    }
}

/// Security definition as written in the document.
///
/// Fields are kept loose so that unknown or partially described schemes
/// still parse; [`SecurityDefinition::scheme`] gives the typed view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityDefinition {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub scopes: BTreeMap<String, String>,
}

impl SecurityDefinition {
    /// An `apiKey` definition.
    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        Self {
            kind: Some("apiKey".to_string()),
            name: Some(name.into()),
            location: Some(location.as_str().to_string()),
            ..Default::default()
        }
    }

    /// A `basic` definition.
    pub fn basic() -> Self {
        Self {
            kind: Some("basic".to_string()),
            ..Default::default()
        }
    }

    /// An `oauth2` definition.
    pub fn oauth2(flow: impl Into<String>) -> Self {
        Self {
            kind: Some("oauth2".to_string()),
            flow: Some(flow.into()),
            ..Default::default()
        }
    }

    /// Typed view of this definition; `None` when it is malformed.
    pub fn scheme(&self) -> Option<SecurityScheme> {
        match self.kind.as_deref()? {
            "apiKey" => {
                let name = self.name.clone().filter(|n| !n.is_empty())?;
                let location = ApiKeyLocation::parse(self.location.as_deref()?)?;
                Some(SecurityScheme::ApiKey { name, location })
            }
            "basic" => Some(SecurityScheme::Basic),
            "oauth2" => Some(SecurityScheme::OAuth2),
            _ => None,
        }
    }
}

/// Recognized security scheme kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityScheme {
    ApiKey {
        name: String,
        location: ApiKeyLocation,
    },
    Basic,
    OAuth2,
}

/// API key location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKeyLocation {
    Query,
    Header,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Header => "header",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "query" => Some(ApiKeyLocation::Query),
            "header" => Some(ApiKeyLocation::Header),
            _ => None,
        }
    }
}

/// Keep well-formed security definitions and drop the rest.
fn lenient_definitions<'de, D>(
    deserializer: D,
) -> Result<IndexMap<String, SecurityDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, serde_json::Value>>::deserialize(deserializer)?
        .unwrap_or_default();

    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| {
            match serde_json::from_value::<SecurityDefinition>(value) {
                Ok(definition) => Some((name, definition)),
                Err(e) => {
                    tracing::debug!(scheme = %name, error = %e, "Ignoring malformed security definition");
                    None
                }
            }
        })
        .collect())
}
