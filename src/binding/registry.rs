use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::binding::decoders::{
    CookieBinder, DefaultPathBinder, HeaderBinder, JsonBodyBinder, QueryBinder,
};
use crate::binding::spec::BindingSpec;
use crate::context::RequestContext;
use crate::validator::StructValidator;

/// Matched path parameters as a name → values multimap.
pub type PathValues = HashMap<String, Vec<String>>;

/// A named decoder: populate the fields bound to `tag` from the raw request
/// into the accumulating document, or fail with a descriptive error.
pub trait Binder: Send + Sync {
    fn bind(
        &self,
        tag: &str,
        ctx: &RequestContext,
        spec: &BindingSpec,
        out: &mut Map<String, Value>,
    ) -> anyhow::Result<()>;
}

/// The distinguished path-parameter decoder.
pub trait PathBinder: Send + Sync {
    fn bind_path(
        &self,
        params: &PathValues,
        spec: &BindingSpec,
        out: &mut Map<String, Value>,
    ) -> anyhow::Result<()>;
}

/// Named decoders plus the path decoder and the optional struct validator.
///
/// Mutated only while the [`crate::dispatch::DispatcherBuilder`] is being
/// assembled; once the dispatcher is built the registry is shared read-only
/// across concurrently served requests.
pub struct BinderRegistry {
    binders: HashMap<String, Box<dyn Binder>>,
    path_binder: Box<dyn PathBinder>,
    validator: Option<Box<dyn StructValidator>>,
}

impl BinderRegistry {
    /// Registry with the default decoder set: `json`, `query`, `header`,
    /// `cookie`, and the default path decoder. No validator: validation is
    /// an explicit opt-in via [`crate::dispatch::DispatcherBuilder::validator`].
    pub fn new() -> Self {
        let mut binders: HashMap<String, Box<dyn Binder>> = HashMap::new();
        binders.insert("json".to_string(), Box::new(JsonBodyBinder));
        binders.insert("query".to_string(), Box::new(QueryBinder));
        binders.insert("header".to_string(), Box::new(HeaderBinder));
        binders.insert("cookie".to_string(), Box::new(CookieBinder));
        Self {
            binders,
            path_binder: Box::new(DefaultPathBinder),
            validator: None,
        }
    }

    /// Add or replace the decoder registered under `tag`.
    pub fn insert_binder(&mut self, tag: impl Into<String>, binder: Box<dyn Binder>) {
        self.binders.insert(tag.into(), binder);
    }

    pub fn set_path_binder(&mut self, binder: Box<dyn PathBinder>) {
        self.path_binder = binder;
    }

    pub fn set_validator(&mut self, validator: Box<dyn StructValidator>) {
        self.validator = Some(validator);
    }

    pub fn binder(&self, tag: &str) -> Option<&dyn Binder> {
        self.binders.get(tag).map(|b| b.as_ref())
    }

    pub fn path_binder(&self) -> &dyn PathBinder {
        self.path_binder.as_ref()
    }

    pub fn validator(&self) -> Option<&dyn StructValidator> {
        self.validator.as_deref()
    }

    /// Registration-time contract: every source tag a request type binds
    /// must have a registered decoder. A violation is a programming bug in
    /// the route definition, so it aborts registration instead of being
    /// surfaced per request.
    ///
    /// # Panics
    ///
    /// Panics when `spec` references a tag with no registered decoder.
    pub fn contract_check(&self, spec: &BindingSpec) {
        for tag in spec.sources {
            assert!(
                self.binders.contains_key(*tag),
                "request type `{}` binds source `{}` but no decoder is registered for it",
                spec.type_name,
                tag
            );
        }
    }
}

impl Default for BinderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
