// Specio - call Swagger-described HTTP APIs by operation id
//
// This library binds every operation of a Swagger 2.0 document to a request
// builder, with path templating, API key injection and pluggable awaitables.

// Re-export the member crates
pub use specio_client::*;
pub use specio_spec;

pub use specio_spec::{
    ApiKeyLocation, DocumentFormat, HttpMethod, OperationBuilder, OperationSpec, PathItem,
    PathItemBuilder, SecurityDefinition, SecurityScheme, Specification, SpecificationBuilder,
    SpecError,
};

/// Generate a client for `spec` over the default transport.
pub fn client(spec: Specification) -> SpecioClient {
    SpecioClient::new(spec)
}

// Prelude for common imports
pub mod prelude {
    pub use crate::client;
    pub use specio_client::prelude::*;
    pub use specio_spec::{
        ApiKeyLocation, HttpMethod, OperationBuilder, PathItemBuilder, SecurityDefinition,
        Specification, SpecificationBuilder,
    };
}
