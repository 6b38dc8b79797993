//! Method descriptor: the immutable, cached plan derived from a service
//! interface's method declaration.

use crate::error::ClientError;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Patch => "PATCH",
            Verb::Head => "HEAD",
        }
    }
}

/// Parameter binding kinds. `HeaderLiteral` is a constant baked into the
/// descriptor at parse time; `HeaderParam` reads an argument supplied per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Path,
    Query,
    Header,
    HeaderLiteral,
    Body,
    HostSubstitution,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamBinding {
    pub kind: BindingKind,
    pub name: &'static str,
    pub already_encoded: bool,
    /// Only meaningful for `HeaderLiteral`: the constant value to emit.
    pub literal_value: Option<&'static str>,
}

impl ParamBinding {
    pub fn path(name: &'static str, already_encoded: bool) -> Self {
        ParamBinding {
            kind: BindingKind::Path,
            name,
            already_encoded,
            literal_value: None,
        }
    }

    pub fn query(name: &'static str, already_encoded: bool) -> Self {
        ParamBinding {
            kind: BindingKind::Query,
            name,
            already_encoded,
            literal_value: None,
        }
    }

    pub fn header(name: &'static str) -> Self {
        ParamBinding {
            kind: BindingKind::Header,
            name,
            already_encoded: true,
            literal_value: None,
        }
    }

    pub fn header_literal(name: &'static str, value: &'static str) -> Self {
        ParamBinding {
            kind: BindingKind::HeaderLiteral,
            name,
            already_encoded: true,
            literal_value: Some(value),
        }
    }

    pub fn host_substitution(name: &'static str, already_encoded: bool) -> Self {
        ParamBinding {
            kind: BindingKind::HostSubstitution,
            name,
            already_encoded,
            literal_value: None,
        }
    }

    pub fn body() -> Self {
        ParamBinding {
            kind: BindingKind::Body,
            name: "body",
            already_encoded: true,
            literal_value: None,
        }
    }
}

/// The declared content-type annotation on a BODY binding, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyBinding {
    pub declared_content_type: Option<&'static str>,
}

/// What shape of body the response handler must extract. The service method
/// declares it explicitly, since Rust has no way to recover "is T a byte
/// stream" from a generic type parameter alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Void,
    /// HEAD verb, boolean result: `200 <= status < 300`.
    HeadBoolean,
    ByteStream,
    Bytes,
    ChunkedBytes,
    /// Deserialized via the codec; optionally wire-remapped by the caller.
    Typed,
    /// A lazy sequence of non-byte elements. Always rejected at
    /// descriptor-build time.
    TypedElementStream,
}

/// The tagged return-shape variant: how the caller consumes the eventual
/// result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnShape {
    Void,
    Sync,
    Future,
    CompletionOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDescriptor {
    /// Diagnostic tag for the declared error kind (the body schema type
    /// itself is carried by `RestOperation::ErrorBody`, not here).
    pub error_kind: &'static str,
}

/// The immutable, cached per-method plan. Built once via
/// [`MethodDescriptorBuilder`] and frozen thereafter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub method_name: &'static str,
    pub verb: Verb,
    pub host_template: Option<&'static str>,
    pub path_template: &'static str,
    pub bindings: Vec<ParamBinding>,
    pub body_binding: Option<BodyBinding>,
    pub expected_statuses: Vec<u16>,
    pub error_descriptor: ErrorDescriptor,
    pub return_shape: ReturnShape,
    pub entity_kind: EntityKind,
    /// Whether the declared result type is the status+headers+body envelope
    /// rather than the plain body, orthogonal to `return_shape` and
    /// `entity_kind`.
    pub uses_envelope: bool,
}

pub const DEFAULT_EXPECTED_STATUSES: [u16; 4] = [200, 201, 202, 204];

pub struct MethodDescriptorBuilder {
    method_name: &'static str,
    verb: Verb,
    host_template: Option<&'static str>,
    path_template: &'static str,
    bindings: Vec<ParamBinding>,
    body_binding: Option<BodyBinding>,
    expected_statuses: Vec<u16>,
    error_descriptor: ErrorDescriptor,
    return_shape: ReturnShape,
    entity_kind: EntityKind,
    uses_envelope: bool,
}

impl MethodDescriptorBuilder {
    pub fn new(method_name: &'static str, verb: Verb, path_template: &'static str) -> Self {
        MethodDescriptorBuilder {
            method_name,
            verb,
            host_template: None,
            path_template,
            bindings: Vec::new(),
            body_binding: None,
            expected_statuses: DEFAULT_EXPECTED_STATUSES.to_vec(),
            error_descriptor: ErrorDescriptor { error_kind: "unexpected-status" },
            return_shape: ReturnShape::Future,
            entity_kind: EntityKind::Typed,
            uses_envelope: false,
        }
    }

    pub fn host(mut self, host_template: &'static str) -> Self {
        self.host_template = Some(host_template);
        self
    }

    pub fn binding(mut self, binding: ParamBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn body_binding(mut self, declared_content_type: Option<&'static str>) -> Self {
        self.body_binding = Some(BodyBinding { declared_content_type });
        self
    }

    pub fn expected_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.expected_statuses = statuses;
        self
    }

    pub fn error_kind(mut self, error_kind: &'static str) -> Self {
        self.error_descriptor = ErrorDescriptor { error_kind };
        self
    }

    pub fn return_shape(mut self, shape: ReturnShape) -> Self {
        self.return_shape = shape;
        self
    }

    pub fn entity_kind(mut self, kind: EntityKind) -> Self {
        self.entity_kind = kind;
        self
    }

    pub fn uses_envelope(mut self, uses_envelope: bool) -> Self {
        self.uses_envelope = uses_envelope;
        self
    }

    /// Validates and freezes the descriptor:
    /// - every `{name}` in the path has exactly one PATH binding,
    /// - BODY appears at most once,
    /// - the expected-status set is non-empty,
    /// - the entity kind is supported.
    pub fn build(self) -> Result<MethodDescriptor, ClientError> {
        if self.entity_kind == EntityKind::TypedElementStream {
            return Err(ClientError::UnsupportedReturnType {
                method: self.method_name.to_owned(),
                reason: "a lazy sequence of non-byte elements is not a supported return shape".to_owned(),
            });
        }

        let body_count = self.bindings.iter().filter(|b| b.kind == BindingKind::Body).count();
        if body_count > 1 {
            return Err(ClientError::MalformedInterface {
                method: self.method_name.to_owned(),
                reason: format!("BODY binding declared {} times, expected at most 1", body_count),
            });
        }

        let path_names: HashSet<&str> = self
            .bindings
            .iter()
            .filter(|b| b.kind == BindingKind::Path)
            .map(|b| b.name)
            .collect();
        for placeholder in extract_placeholders(self.path_template) {
            if !path_names.contains(placeholder.as_str()) {
                return Err(ClientError::MalformedInterface {
                    method: self.method_name.to_owned(),
                    reason: format!("path placeholder '{{{}}}' has no matching PATH binding", placeholder),
                });
            }
        }
        // Every PATH binding must also appear in the template, or it is dead
        // configuration that will never substitute anything.
        let template_names: HashSet<String> = extract_placeholders(self.path_template).into_iter().collect();
        for name in &path_names {
            if !template_names.contains(*name) {
                return Err(ClientError::MalformedInterface {
                    method: self.method_name.to_owned(),
                    reason: format!("PATH binding '{}' has no placeholder in the path template", name),
                });
            }
        }

        if self.expected_statuses.is_empty() {
            return Err(ClientError::MalformedInterface {
                method: self.method_name.to_owned(),
                reason: "expected-status set must not be empty".to_owned(),
            });
        }

        Ok(MethodDescriptor {
            method_name: self.method_name,
            verb: self.verb,
            host_template: self.host_template,
            path_template: self.path_template,
            bindings: self.bindings,
            body_binding: self.body_binding,
            expected_statuses: self.expected_statuses,
            error_descriptor: self.error_descriptor,
            return_shape: self.return_shape,
            entity_kind: self.entity_kind,
            uses_envelope: self.uses_envelope,
        })
    }
}

fn extract_placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after_open = &rest[start + 1..];
        if let Some(end) = after_open.find('}') {
            names.push(after_open[..end].to_owned());
            rest = &after_open[end + 1..];
        } else {
            break;
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unresolved_path_placeholder() {
        let err = MethodDescriptorBuilder::new("m", Verb::Get, "/items/{id}").build().unwrap_err();
        assert!(matches!(err, ClientError::MalformedInterface { .. }));
    }

    #[test]
    fn rejects_dead_path_binding() {
        let err = MethodDescriptorBuilder::new("m", Verb::Get, "/items")
            .binding(ParamBinding::path("id", false))
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedInterface { .. }));
    }

    #[test]
    fn rejects_duplicate_body_binding() {
        let err = MethodDescriptorBuilder::new("m", Verb::Post, "/items")
            .binding(ParamBinding::body())
            .binding(ParamBinding::body())
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedInterface { .. }));
    }

    #[test]
    fn rejects_empty_expected_statuses() {
        let err = MethodDescriptorBuilder::new("m", Verb::Get, "/items")
            .expected_statuses(vec![])
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedInterface { .. }));
    }

    #[test]
    fn rejects_typed_element_stream_return_shape() {
        let err = MethodDescriptorBuilder::new("m", Verb::Get, "/items")
            .entity_kind(EntityKind::TypedElementStream)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedReturnType { .. }));
    }

    #[test]
    fn descriptor_build_is_deterministic() {
        let build = || {
            MethodDescriptorBuilder::new("m", Verb::Get, "/items/{id}")
                .binding(ParamBinding::path("id", false))
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn accepts_well_formed_descriptor() {
        let d = MethodDescriptorBuilder::new("get_item", Verb::Get, "/items/{id}")
            .binding(ParamBinding::path("id", false))
            .build()
            .unwrap();
        assert_eq!(d.verb, Verb::Get);
        assert_eq!(d.expected_statuses, DEFAULT_EXPECTED_STATUSES.to_vec());
    }
}
