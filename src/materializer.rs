//! Request materialization: the per-request pipeline that turns a
//! [`RequestContext`] into a populated, validated instance of a
//! [`Bindable`] struct.
//!
//! Stage order is fixed: path parameters first, then each matched source
//! decoder (declaration order of the type's sources), then the configured
//! validator, then deserialization into the typed struct. The first error
//! wins and the handler is never invoked.

use std::fmt::{Display, Formatter};

use serde_json::{Map, Value};

use crate::binding::registry::BinderRegistry;
use crate::binding::spec::Bindable;
use crate::context::RequestContext;
use crate::validator::ValidationErrors;

/// A request-time binding failure. Routed to the binding-error hook and
/// absorbed there; never crosses into other requests.
#[derive(Debug)]
pub enum BindError {
    /// The path decoder failed.
    Path(anyhow::Error),
    /// A named decoder failed.
    Decoder { tag: String, source: anyhow::Error },
    /// The struct validator rejected the populated document; carries every
    /// violation, not just the first.
    Validation(ValidationErrors),
    /// The populated document did not deserialize into the target type
    /// (missing required field, type mismatch).
    Deserialize {
        type_name: &'static str,
        source: serde_json::Error,
    },
}

impl BindError {
    /// The validator's violations, when this failure came from validation.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            BindError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl Display for BindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::Path(err) => write!(f, "path binding failed: {err:#}"),
            BindError::Decoder { tag, source } => {
                write!(f, "`{tag}` binding failed: {source:#}")
            }
            BindError::Validation(errors) => errors.fmt(f),
            BindError::Deserialize { type_name, source } => {
                write!(f, "invalid request for `{type_name}`: {source}")
            }
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Path(err) | BindError::Decoder { source: err, .. } => Some(&**err),
            BindError::Validation(errors) => Some(errors),
            BindError::Deserialize { source, .. } => Some(source),
        }
    }
}

/// Produce a populated, validated `T` from the context, or fail with the
/// first binding error encountered.
pub fn materialize<T: Bindable>(
    ctx: &RequestContext,
    registry: &BinderRegistry,
) -> Result<T, BindError> {
    let spec = T::binding_spec();
    let mut doc = Map::new();

    if spec.has_path {
        let params = ctx.path_values();
        registry
            .path_binder()
            .bind_path(&params, spec, &mut doc)
            .map_err(BindError::Path)?;
    }

    for tag in spec.sources {
        let binder = registry
            .binder(tag)
            .ok_or_else(|| BindError::Decoder {
                tag: (*tag).to_string(),
                source: anyhow::anyhow!("no decoder registered for `{tag}`"),
            })?;
        binder
            .bind(tag, ctx, spec, &mut doc)
            .map_err(|source| BindError::Decoder {
                tag: (*tag).to_string(),
                source,
            })?;
    }

    if let Some(validator) = registry.validator() {
        validator
            .validate(&Value::Object(doc.clone()), spec)
            .map_err(BindError::Validation)?;
    }

    serde_json::from_value(Value::Object(doc)).map_err(|source| BindError::Deserialize {
        type_name: spec.type_name,
        source,
    })
}
