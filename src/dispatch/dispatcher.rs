use std::sync::Arc;
use std::time::Instant;

use http::Method;
use serde_json::Value;
use tracing::{debug, error, info_span, warn};

use crate::binding::registry::{Binder, BinderRegistry, PathBinder};
use crate::context::RequestContext;
use crate::dispatch::hooks::HookSet;
use crate::handler::RouteHandler;
use crate::materializer::BindError;
use crate::validator::StructValidator;

/// The terminal classification of one request. Exactly one variant is
/// produced per request and triggers exactly one hook.
#[derive(Debug)]
pub enum Outcome {
    /// Materialization failed; the handler was never invoked.
    BindingFailure(BindError),
    /// The handler reported an error.
    HandlerFailure(anyhow::Error),
    /// The handler succeeded, with an optional serialized payload.
    Success(Option<Value>),
}

/// An erased, mounted per-route callback.
pub type RouteCallback = Box<dyn Fn(&mut RequestContext) + Send + Sync>;

/// The host framework's route-registration mechanism: method, path
/// pattern, one callback per registration.
pub trait RouteTable {
    fn mount(&mut self, method: Method, path: &str, callback: RouteCallback);
}

struct Inner {
    registry: BinderRegistry,
    hooks: HookSet,
}

/// Builds a [`Dispatcher`]. All registry and hook mutation happens here;
/// once `build` returns, the configuration is immutable and safe to share
/// across request workers.
pub struct DispatcherBuilder {
    registry: BinderRegistry,
    hooks: HookSet,
}

impl DispatcherBuilder {
    /// Add or replace the decoder registered under `tag`.
    pub fn binder(mut self, tag: impl Into<String>, binder: impl Binder + 'static) -> Self {
        self.registry.insert_binder(tag, Box::new(binder));
        self
    }

    /// Replace the path-parameter decoder.
    pub fn path_binder(mut self, binder: impl PathBinder + 'static) -> Self {
        self.registry.set_path_binder(Box::new(binder));
        self
    }

    /// Enable struct validation. Without this call validation is skipped
    /// entirely; an absent validator is a deliberate configuration, not an
    /// error.
    pub fn validator(mut self, validator: impl StructValidator + 'static) -> Self {
        self.registry.set_validator(Box::new(validator));
        self
    }

    pub fn on_binding_error(
        mut self,
        hook: impl Fn(&mut RequestContext, &BindError) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_binding_error = Box::new(hook);
        self
    }

    pub fn on_handler_error(
        mut self,
        hook: impl Fn(&mut RequestContext, &anyhow::Error) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_handler_error = Box::new(hook);
        self
    }

    pub fn on_success(
        mut self,
        hook: impl Fn(&mut RequestContext, Option<Value>) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_success = Box::new(hook);
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            inner: Arc::new(Inner {
                registry: self.registry,
                hooks: self.hooks,
            }),
        }
    }
}

/// The configured binding/dispatch engine: the binder registry plus the
/// hook set. Cheap to clone; every mounted route holds a shared reference.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// A dispatcher with the default decoders and hooks.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder {
            registry: BinderRegistry::new(),
            hooks: HookSet::default(),
        }
    }

    pub fn registry(&self) -> &BinderRegistry {
        &self.inner.registry
    }

    /// Register `handler` for `method`/`path` on the host route table.
    ///
    /// Checks the handler's binding contract (every source tag its request
    /// type names must have a registered decoder) and panics on violation:
    /// a malformed route is a programming bug and must not start serving.
    ///
    /// Mounting the same method/path pair twice hands the host table two
    /// independent callbacks; whether that replaces, stacks, or rejects is
    /// the host's documented policy, not this layer's.
    pub fn mount<M, H>(&self, routes: &mut dyn RouteTable, method: Method, path: &str, handler: H)
    where
        H: RouteHandler<M>,
    {
        if let Some(spec) = H::request_spec() {
            self.inner.registry.contract_check(spec);
        }
        debug!(
            method = %method,
            path,
            shape = %H::SHAPE,
            request_type = H::request_spec().map(|s| s.type_name).unwrap_or("-"),
            "route mounted"
        );
        let inner = Arc::clone(&self.inner);
        routes.mount(
            method,
            path,
            Box::new(move |ctx| dispatch(&inner, ctx, &handler)),
        );
    }

    pub fn get<M, H>(&self, routes: &mut dyn RouteTable, path: &str, handler: H)
    where
        H: RouteHandler<M>,
    {
        self.mount(routes, Method::GET, path, handler);
    }

    pub fn post<M, H>(&self, routes: &mut dyn RouteTable, path: &str, handler: H)
    where
        H: RouteHandler<M>,
    {
        self.mount(routes, Method::POST, path, handler);
    }

    pub fn put<M, H>(&self, routes: &mut dyn RouteTable, path: &str, handler: H)
    where
        H: RouteHandler<M>,
    {
        self.mount(routes, Method::PUT, path, handler);
    }

    pub fn delete<M, H>(&self, routes: &mut dyn RouteTable, path: &str, handler: H)
    where
        H: RouteHandler<M>,
    {
        self.mount(routes, Method::DELETE, path, handler);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn dispatch<M, H: RouteHandler<M>>(inner: &Inner, ctx: &mut RequestContext, handler: &H) {
    let span = info_span!(
        "request",
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
    );
    let _guard = span.enter();

    let start = Instant::now();
    let outcome = handler.invoke(ctx, &inner.registry);
    let latency_ms = start.elapsed().as_millis() as u64;

    match &outcome {
        Outcome::BindingFailure(err) => warn!(%err, latency_ms, "request binding failed"),
        Outcome::HandlerFailure(err) => error!(%err, latency_ms, "handler failed"),
        Outcome::Success(_) => debug!(latency_ms, "request succeeded"),
    }

    inner.hooks.fire(ctx, outcome);
}
