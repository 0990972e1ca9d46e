use anyhow::{anyhow, Context};
use serde_json::{Map, Value};

use crate::binding::registry::{Binder, PathBinder, PathValues};
use crate::binding::spec::BindingSpec;
use crate::context::RequestContext;

/// Decoder for the `json` tag: picks bound fields out of the parsed request
/// body. An absent body is not an error here; a missing required field
/// surfaces when the document is deserialized or validated.
pub struct JsonBodyBinder;

impl Binder for JsonBodyBinder {
    fn bind(
        &self,
        tag: &str,
        ctx: &RequestContext,
        spec: &BindingSpec,
        out: &mut Map<String, Value>,
    ) -> anyhow::Result<()> {
        let Some(body) = ctx.body.as_ref() else {
            return Ok(());
        };
        let object = body
            .as_object()
            .ok_or_else(|| anyhow!("request body must be a JSON object"))?;
        for field in spec.fields_for(tag) {
            if let Some(value) = object.get(field.key) {
                out.insert(field.field.to_string(), value.clone());
            }
        }
        Ok(())
    }
}

/// Decoder for the `query` tag.
pub struct QueryBinder;

impl Binder for QueryBinder {
    fn bind(
        &self,
        tag: &str,
        ctx: &RequestContext,
        spec: &BindingSpec,
        out: &mut Map<String, Value>,
    ) -> anyhow::Result<()> {
        for field in spec.fields_for(tag) {
            if let Some(raw) = ctx.get_query_param(field.key) {
                let value = field
                    .kind
                    .coerce(raw)
                    .with_context(|| format!("query parameter `{}`", field.key))?;
                out.insert(field.field.to_string(), value);
            }
        }
        Ok(())
    }
}

/// Decoder for the `header` tag; lookup is case-insensitive.
pub struct HeaderBinder;

impl Binder for HeaderBinder {
    fn bind(
        &self,
        tag: &str,
        ctx: &RequestContext,
        spec: &BindingSpec,
        out: &mut Map<String, Value>,
    ) -> anyhow::Result<()> {
        for field in spec.fields_for(tag) {
            if let Some(raw) = ctx.get_header(field.key) {
                let value = field
                    .kind
                    .coerce(raw)
                    .with_context(|| format!("header `{}`", field.key))?;
                out.insert(field.field.to_string(), value);
            }
        }
        Ok(())
    }
}

/// Decoder for the `cookie` tag.
pub struct CookieBinder;

impl Binder for CookieBinder {
    fn bind(
        &self,
        tag: &str,
        ctx: &RequestContext,
        spec: &BindingSpec,
        out: &mut Map<String, Value>,
    ) -> anyhow::Result<()> {
        for field in spec.fields_for(tag) {
            if let Some(raw) = ctx.get_cookie(field.key) {
                let value = field
                    .kind
                    .coerce(raw)
                    .with_context(|| format!("cookie `{}`", field.key))?;
                out.insert(field.field.to_string(), value);
            }
        }
        Ok(())
    }
}

/// Default path decoder: binds the first matched value for each path-bound
/// field. Hosts with exotic parameter styles can replace it via
/// [`crate::dispatch::DispatcherBuilder::path_binder`].
pub struct DefaultPathBinder;

impl PathBinder for DefaultPathBinder {
    fn bind_path(
        &self,
        params: &PathValues,
        spec: &BindingSpec,
        out: &mut Map<String, Value>,
    ) -> anyhow::Result<()> {
        for field in spec.path_fields() {
            if let Some(raw) = params.get(field.key).and_then(|values| values.first()) {
                let value = field
                    .kind
                    .coerce(raw)
                    .with_context(|| format!("path parameter `{}`", field.key))?;
                out.insert(field.field.to_string(), value);
            }
        }
        Ok(())
    }
}
