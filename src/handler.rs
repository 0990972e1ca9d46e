//! The closed set of handler shapes.
//!
//! A route handler is a plain function over the request context, optionally
//! taking a materialized request struct and optionally returning a response
//! payload. The four accepted shapes are selected by the registration
//! call's generics; anything else fails to compile:
//!
//! - `Fn(&mut RequestContext) -> Result<(), E>`
//! - `Fn(&mut RequestContext, Req) -> Result<(), E>`
//! - `Fn(&mut RequestContext) -> Result<Option<Resp>, E>`
//! - `Fn(&mut RequestContext, Req) -> Result<Option<Resp>, E>`
//!
//! with `Req: Bindable`, `Resp: Serialize`, `E: Into<anyhow::Error>`.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::binding::registry::BinderRegistry;
use crate::binding::spec::{Bindable, BindingSpec};
use crate::context::RequestContext;
use crate::dispatch::Outcome;
use crate::materializer::materialize;

/// Which of the four shapes a registered handler has. Fixed per route at
/// registration; used for the registration log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerShape {
    /// Context only, no payload.
    Bare,
    /// Context plus request struct, no payload.
    Typed,
    /// Context only, optional payload.
    BarePayload,
    /// Context plus request struct, optional payload.
    TypedPayload,
}

impl Display for HandlerShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerShape::Bare => "ctx",
            HandlerShape::Typed => "ctx+req",
            HandlerShape::BarePayload => "ctx->resp",
            HandlerShape::TypedPayload => "ctx+req->resp",
        };
        write!(f, "{s}")
    }
}

/// Shape markers. Only used as the `M` parameter of [`RouteHandler`] so the
/// compiler can pick exactly one blanket impl per function type.
pub mod shape {
    use std::marker::PhantomData;

    pub struct Bare<E>(PhantomData<E>);
    pub struct Typed<Req, E>(PhantomData<(Req, E)>);
    pub struct BarePayload<Resp, E>(PhantomData<(Resp, E)>);
    pub struct TypedPayload<Req, Resp, E>(PhantomData<(Req, Resp, E)>);
}

/// A registerable handler. Implemented for plain functions and closures of
/// the four accepted shapes; `invoke` materializes the request when the
/// shape has one and folds the call into an [`Outcome`].
pub trait RouteHandler<M>: Send + Sync + 'static {
    const SHAPE: HandlerShape;

    /// The request type's binding descriptors, when the shape has a
    /// request argument.
    fn request_spec() -> Option<&'static BindingSpec>;

    fn invoke(&self, ctx: &mut RequestContext, registry: &BinderRegistry) -> Outcome;
}

fn success_payload<Resp: Serialize>(resp: Option<Resp>) -> Outcome {
    match resp {
        None => Outcome::Success(None),
        Some(resp) => match serde_json::to_value(resp) {
            Ok(value) => Outcome::Success(Some(value)),
            Err(err) => Outcome::HandlerFailure(
                anyhow::Error::new(err).context("failed to serialize response payload"),
            ),
        },
    }
}

impl<F, E> RouteHandler<shape::Bare<E>> for F
where
    F: Fn(&mut RequestContext) -> Result<(), E> + Send + Sync + 'static,
    E: Into<anyhow::Error> + 'static,
{
    const SHAPE: HandlerShape = HandlerShape::Bare;

    fn request_spec() -> Option<&'static BindingSpec> {
        None
    }

    fn invoke(&self, ctx: &mut RequestContext, _registry: &BinderRegistry) -> Outcome {
        match self(ctx) {
            Ok(()) => Outcome::Success(None),
            Err(err) => Outcome::HandlerFailure(err.into()),
        }
    }
}

impl<F, Req, E> RouteHandler<shape::Typed<Req, E>> for F
where
    F: Fn(&mut RequestContext, Req) -> Result<(), E> + Send + Sync + 'static,
    Req: Bindable + Send + 'static,
    E: Into<anyhow::Error> + 'static,
{
    const SHAPE: HandlerShape = HandlerShape::Typed;

    fn request_spec() -> Option<&'static BindingSpec> {
        Some(Req::binding_spec())
    }

    fn invoke(&self, ctx: &mut RequestContext, registry: &BinderRegistry) -> Outcome {
        let req = match materialize::<Req>(ctx, registry) {
            Ok(req) => req,
            Err(err) => return Outcome::BindingFailure(err),
        };
        match self(ctx, req) {
            Ok(()) => Outcome::Success(None),
            Err(err) => Outcome::HandlerFailure(err.into()),
        }
    }
}

impl<F, Resp, E> RouteHandler<shape::BarePayload<Resp, E>> for F
where
    F: Fn(&mut RequestContext) -> Result<Option<Resp>, E> + Send + Sync + 'static,
    Resp: Serialize + 'static,
    E: Into<anyhow::Error> + 'static,
{
    const SHAPE: HandlerShape = HandlerShape::BarePayload;

    fn request_spec() -> Option<&'static BindingSpec> {
        None
    }

    fn invoke(&self, ctx: &mut RequestContext, _registry: &BinderRegistry) -> Outcome {
        match self(ctx) {
            Ok(resp) => success_payload(resp),
            Err(err) => Outcome::HandlerFailure(err.into()),
        }
    }
}

impl<F, Req, Resp, E> RouteHandler<shape::TypedPayload<Req, Resp, E>> for F
where
    F: Fn(&mut RequestContext, Req) -> Result<Option<Resp>, E> + Send + Sync + 'static,
    Req: Bindable + Send + 'static,
    Resp: Serialize + 'static,
    E: Into<anyhow::Error> + 'static,
{
    const SHAPE: HandlerShape = HandlerShape::TypedPayload;

    fn request_spec() -> Option<&'static BindingSpec> {
        Some(Req::binding_spec())
    }

    fn invoke(&self, ctx: &mut RequestContext, registry: &BinderRegistry) -> Outcome {
        let req = match materialize::<Req>(ctx, registry) {
            Ok(req) => req,
            Err(err) => return Outcome::BindingFailure(err),
        };
        match self(ctx, req) {
            Ok(resp) => success_payload(resp),
            Err(err) => Outcome::HandlerFailure(err.into()),
        }
    }
}
