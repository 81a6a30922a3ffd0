//! Operation binding.
//!
//! Walks the path table of a [`Specification`] and records, per operation
//! id, what a call needs to build its request: the path template, the
//! method and the credential injection resolved from the security
//! definitions. Resolution happens once here, never per call.

use crate::security::{self, CredentialInjection};
use http::Method;
use specio_spec::{HttpMethod, SecurityScheme, Specification};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Bind-time description of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub operation_id: String,
    pub path: String,
    pub method: HttpMethod,
    pub security: Option<SecurityScheme>,
}

impl Binding {
    /// HTTP method to send.
    pub fn http_method(&self) -> Method {
        to_http_method(self.method)
    }

    /// Credential injection, if the operation is guarded by an API key.
    pub fn injection(&self) -> Option<CredentialInjection> {
        self.security.as_ref().and_then(CredentialInjection::for_scheme)
    }
}

/// Map a document method onto an [`http::Method`].
pub fn to_http_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
    }
}

/// Bind every operation that declares an operation id.
///
/// Operations without an id are skipped. When two operations share an id
/// the one visited last wins.
pub fn bind(spec: &Specification) -> BTreeMap<String, Binding> {
    let mut bindings = BTreeMap::new();

    for (path, method, operation) in spec.operations() {
        let Some(operation_id) = operation.operation_id() else {
            trace!(%path, %method, "Skipping operation without operationId");
            continue;
        };

        let binding = Binding {
            operation_id: operation_id.to_string(),
            path: path.to_string(),
            method,
            security: security::resolve(spec, operation),
        };
        debug!(operation_id, %method, path, "Bound operation");

        if let Some(previous) = bindings.insert(operation_id.to_string(), binding) {
            warn!(
                operation_id,
                previous_path = %previous.path,
                previous_method = %previous.method,
                %path,
                %method,
                "Duplicate operationId, keeping the later operation"
            );
        }
    }

    bindings
}
