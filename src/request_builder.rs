//! Request builder: turns a [`MethodDescriptor`] plus an operation's per-call
//! argument values into a concrete [`Request`].

use crate::codec::{encoding_for_content_type, resolve_content_type};
use crate::descriptor::{BindingKind, MethodDescriptor};
use crate::error::ClientError;
use crate::model::{Body, HeaderMap};
use crate::operation::{BodyValue, NamedArg};
use crate::url_builder::{percent_encode, substitute_path, UrlBuilder};
use url::Url;

/// A concrete HTTP request, ready to hand to the policy pipeline.
#[derive(Clone, Debug)]
pub struct Request {
    pub verb: String,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Body>,
    /// The fully-qualified method name, carried through for diagnostics.
    pub method_name: &'static str,
}

const X_HTTP_METHOD_OVERRIDE: &str = "X-HTTP-Method-Override";

pub struct RequestBuilder<'a> {
    pub descriptor: &'a MethodDescriptor,
    pub base_url: &'a Url,
    pub path_args: Vec<NamedArg>,
    pub query_args: Vec<NamedArg>,
    pub header_args: Vec<(&'static str, String)>,
    pub body_value: Option<BodyValue>,
    /// Whether the transport natively supports PATCH. When false, PATCH is
    /// rewritten to POST + override header.
    pub transport_supports_patch: bool,
    /// Client-wide default headers, seeded before descriptor bindings apply
    /// so a method's own HEADER/HEADER-LITERAL bindings take precedence over
    /// a configured default of the same name.
    pub default_headers: HeaderMap,
}

impl<'a> RequestBuilder<'a> {
    pub fn build(self) -> Result<Request, ClientError> {
        let descriptor = self.descriptor;
        let method = descriptor.method_name;

        // Step 1: host then path placeholder substitution.
        let host_subst: Vec<(&str, String)> = self
            .path_args
            .iter()
            .filter(|(name, _)| {
                descriptor
                    .bindings
                    .iter()
                    .any(|b| b.kind == BindingKind::HostSubstitution && b.name == *name)
            })
            .filter_map(|(name, value)| value.clone().map(|v| (*name, v)))
            .map(|(name, value)| (name, encode_if_needed(descriptor, name, value)))
            .collect();

        let host = match descriptor.host_template {
            Some(template) => substitute_path(template, &host_subst),
            None => String::new(),
        };

        let path_subst: Vec<(&str, String)> = self
            .path_args
            .iter()
            .filter(|(name, _)| {
                descriptor
                    .bindings
                    .iter()
                    .any(|b| b.kind == BindingKind::Path && b.name == *name)
            })
            .filter_map(|(name, value)| value.clone().map(|v| (*name, v)))
            .map(|(name, value)| (name, encode_if_needed(descriptor, name, value)))
            .collect();

        let path = substitute_path(descriptor.path_template, &path_subst);

        let base = if host.is_empty() {
            self.base_url.clone()
        } else {
            Url::parse(&host).map_err(|source| ClientError::UrlParse { method: method.to_owned(), source })?
        };

        let path = path.trim_start_matches('/').to_owned();
        let mut url_builder = UrlBuilder::new(&base, path);

        // Step 2: query bindings, in descriptor order; null values omitted.
        for (name, value) in &self.query_args {
            if let Some(value) = value {
                let encoded = encode_if_needed(descriptor, name, value.clone());
                url_builder.query_pair(name, &encoded);
            }
        }
        let url = url_builder
            .build()
            .map_err(|source| ClientError::UrlParse { method: method.to_owned(), source })?;

        // Step 3: headers, in declarative binding order; later duplicates overwrite.
        let mut headers = self.default_headers.clone();
        for binding in &descriptor.bindings {
            match binding.kind {
                BindingKind::HeaderLiteral => {
                    if let Some(value) = binding.literal_value {
                        headers.set(binding.name, value);
                    }
                },
                BindingKind::Header => {
                    if let Some((_, value)) = self.header_args.iter().find(|(name, _)| *name == binding.name) {
                        headers.set(binding.name, value.clone());
                    }
                },
                _ => {},
            }
        }

        // Step 4-6: resolve content-type, pick encoding, encode body.
        let body = match self.body_value {
            None => None,
            Some(value) => {
                let is_opaque = matches!(value, BodyValue::Bytes(_) | BodyValue::Text(_));
                let declared = descriptor.body_binding.as_ref().and_then(|b| b.declared_content_type);
                let content_type = resolve_content_type(declared, headers.get("content-type"), is_opaque);
                let encoding = encoding_for_content_type(Some(&content_type));
                headers.set("content-type", content_type.clone());
                value.into_body(&content_type, encoding)?
            },
        };

        // PATCH rewriting for transports/proxies that reject the verb outright.
        let mut verb = descriptor.verb.as_str().to_owned();
        if descriptor.verb == crate::descriptor::Verb::Patch && !self.transport_supports_patch {
            verb = "POST".to_owned();
            headers.set(X_HTTP_METHOD_OVERRIDE, "PATCH");
        }

        Ok(Request {
            verb,
            url,
            headers,
            body,
            method_name: method,
        })
    }
}

fn encode_if_needed(descriptor: &MethodDescriptor, name: &str, value: String) -> String {
    let already_encoded = descriptor
        .bindings
        .iter()
        .find(|b| b.name == name && matches!(b.kind, BindingKind::Path | BindingKind::Query | BindingKind::HostSubstitution))
        .map(|b| b.already_encoded)
        .unwrap_or(false);

    if already_encoded {
        value
    } else {
        percent_encode(&value)
    }
}
