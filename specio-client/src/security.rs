//! Security scheme resolution.

use crate::RequestBuilder;
use specio_spec::{ApiKeyLocation, OperationSpec, SecurityScheme, Specification};
use tracing::debug;

/// Look up the security scheme guarding `operation`.
///
/// Only the first key of the first requirement is consulted. A missing or
/// malformed definition resolves to `None`.
pub fn resolve(spec: &Specification, operation: &OperationSpec) -> Option<SecurityScheme> {
    let name = operation.security_scheme_name()?;
    let Some(definition) = spec.security_definition(name) else {
        debug!(scheme = %name, "Security scheme is not defined");
        return None;
    };
    let scheme = definition.scheme();
    if scheme.is_none() {
        debug!(scheme = %name, "Security definition is malformed");
    }
    scheme
}

/// How to attach an API key to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialInjection {
    pub name: String,
    pub location: ApiKeyLocation,
}

impl CredentialInjection {
    /// Injection for `scheme`, if it is one the client acts on.
    ///
    /// `basic` and `oauth2` are recognized but produce no injection.
    pub fn for_scheme(scheme: &SecurityScheme) -> Option<Self> {
        match scheme {
            SecurityScheme::ApiKey { name, location } => Some(Self {
                name: name.clone(),
                location: *location,
            }),
            SecurityScheme::Basic | SecurityScheme::OAuth2 => {
                debug!(scheme = ?scheme, "Security scheme not supported, no credential attached");
                None
            }
        }
    }

    /// Attach `key` to the request.
    pub fn apply(&self, request: RequestBuilder, key: &str) -> RequestBuilder {
        request.credential(self.name.as_str(), self.location, key)
    }
}
