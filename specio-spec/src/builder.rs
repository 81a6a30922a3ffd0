//! Builders for assembling specifications in code

use crate::spec::*;

/// Builder for specification documents
#[derive(Debug, Clone)]
pub struct SpecificationBuilder {
    spec: Specification,
}

impl Default for SpecificationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecificationBuilder {
    /// Create a new, empty Swagger 2.0 document
    pub fn new() -> Self {
        Self {
            spec: Specification {
                swagger: Some("2.0".to_string()),
                ..Default::default()
            },
        }
    }

    /// Set title and version
    pub fn info(mut self, title: impl Into<String>, version: impl Into<String>) -> Self {
        let info = self.spec.info.get_or_insert_with(Info::default);
        info.title = Some(title.into());
        info.version = Some(version.into());
        self
    }

    /// Append a scheme; the first one added is active
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.spec.schemes.push(scheme.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.spec.host = Some(host.into());
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.spec.base_path = Some(base_path.into());
        self
    }

    /// Add a path, replacing any existing item for the same template
    pub fn path(mut self, path: impl Into<String>, item: PathItem) -> Self {
        self.spec.paths.insert(path.into(), item);
        self
    }

    /// Add a single operation under `path`
    pub fn operation(
        mut self,
        path: impl Into<String>,
        method: HttpMethod,
        operation: OperationSpec,
    ) -> Self {
        let item = self.spec.paths.entry(path.into()).or_default();
        *item.operation_mut(method) = Some(operation);
        self
    }

    /// Add a security definition
    pub fn security_definition(
        mut self,
        name: impl Into<String>,
        definition: SecurityDefinition,
    ) -> Self {
        self.spec
            .security_definitions
            .insert(name.into(), definition);
        self
    }

    /// Add an `apiKey` security definition
    pub fn api_key_auth(
        self,
        name: impl Into<String>,
        key_name: impl Into<String>,
        location: ApiKeyLocation,
    ) -> Self {
        self.security_definition(name, SecurityDefinition::api_key(key_name, location))
    }

    pub fn build(self) -> Specification {
        self.spec
    }
}

/// Builder for path items
#[derive(Debug, Default)]
pub struct PathItemBuilder {
    item: PathItem,
}

impl PathItemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod, operation: OperationSpec) -> Self {
        *self.item.operation_mut(method) = Some(operation);
        self
    }

    pub fn head(self, operation: OperationSpec) -> Self {
        self.method(HttpMethod::Head, operation)
    }

    pub fn options(self, operation: OperationSpec) -> Self {
        self.method(HttpMethod::Options, operation)
    }

    pub fn get(self, operation: OperationSpec) -> Self {
        self.method(HttpMethod::Get, operation)
    }

    pub fn post(self, operation: OperationSpec) -> Self {
        self.method(HttpMethod::Post, operation)
    }

    pub fn put(self, operation: OperationSpec) -> Self {
        self.method(HttpMethod::Put, operation)
    }

    pub fn patch(self, operation: OperationSpec) -> Self {
        self.method(HttpMethod::Patch, operation)
    }

    pub fn delete(self, operation: OperationSpec) -> Self {
        self.method(HttpMethod::Delete, operation)
    }

    pub fn build(self) -> PathItem {
        self.item
    }
}

/// Builder for operations
#[derive(Debug, Default)]
pub struct OperationBuilder {
    operation: OperationSpec,
}

impl OperationBuilder {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation: OperationSpec {
                operation_id: Some(operation_id.into()),
                ..Default::default()
            },
        }
    }

    /// An operation without an id; the client will not bind it
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.operation.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.operation.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.operation.tags.push(tag.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.operation.deprecated = true;
        self
    }

    /// Require the named security scheme (no scopes)
    pub fn security(mut self, scheme: impl Into<String>) -> Self {
        let mut requirement = SecurityRequirement::new();
        requirement.insert(scheme.into(), Vec::new());
        self.operation.security.push(requirement);
        self
    }

    pub fn build(self) -> OperationSpec {
        self.operation
    }
}
