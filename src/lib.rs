//! # routebind
//!
//! **routebind** lets an HTTP route handler be written as a plain typed
//! function instead of hand-rolled context plumbing: a request struct
//! declares per-field binding descriptors with `#[derive(Bindable)]`, a
//! [`Dispatcher`] decodes and validates the request from the host
//! framework's context, invokes the handler, and funnels the outcome
//! through configurable success/error hooks.
//!
//! The host framework keeps ownership of transport, routing, and
//! scheduling; routebind plugs into it through two seams: the
//! [`dispatch::RouteTable`] trait (route registration) and the
//! [`context::RequestContext`] type host glue builds per request.
//!
//! ## Modules
//!
//! - [`binding`] - field binding descriptors, the decoder registry, and
//!   the built-in `json`/`query`/`header`/`cookie`/path decoders
//! - [`materializer`] - the per-request decode → validate → deserialize
//!   pipeline
//! - [`handler`] - the closed set of accepted handler shapes
//! - [`dispatch`] - the `Dispatcher` configuration object, outcome
//!   classification, and hooks
//! - [`validator`] - the struct-validator seam and a JSON Schema
//!   implementation
//! - [`context`] - the per-request view handed to handlers and hooks
//! - [`envelope`] - the `{code, message, data}` response envelope
//! - [`logging`] - tracing bootstrap and the host log bridge
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use routebind::{Bindable, Dispatcher, RequestContext, RouteCallback, RouteTable};
//!
//! #[derive(Debug, serde::Deserialize, Bindable)]
//! struct EchoRequest {
//!     #[bind(path)]
//!     id: String,
//!     #[bind(query)]
//!     message: Option<String>,
//! }
//!
//! // A stand-in for the host framework's route table.
//! #[derive(Default)]
//! struct Table(Vec<(Method, String, RouteCallback)>);
//!
//! impl RouteTable for Table {
//!     fn mount(&mut self, method: Method, path: &str, callback: RouteCallback) {
//!         self.0.push((method, path.to_string(), callback));
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new();
//! let mut table = Table::default();
//! dispatcher.get(
//!     &mut table,
//!     "/echo/{id}",
//!     |_ctx: &mut RequestContext, req: EchoRequest| -> anyhow::Result<()> {
//!         assert_eq!(req.id, "42");
//!         Ok(())
//!     },
//! );
//!
//! let mut ctx = RequestContext::builder(Method::GET, "/echo/42")
//!     .path_param("id", "42")
//!     .build();
//! (table.0[0].2)(&mut ctx);
//! assert_eq!(ctx.take_response().map(|r| r.status), Some(200));
//! ```

pub mod binding;
pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod materializer;
pub mod validator;

pub use binding::{
    Bindable, Binder, BinderRegistry, BindingSpec, FieldBinding, FieldKind, PathBinder, PathValues,
};
pub use context::{HeaderVec, ParamVec, RequestContext, ResponseParts};
pub use dispatch::{Dispatcher, DispatcherBuilder, Outcome, RouteCallback, RouteTable};
pub use envelope::Envelope;
pub use handler::{HandlerShape, RouteHandler};
pub use ids::RequestId;
pub use materializer::{materialize, BindError};
pub use validator::{SchemaValidator, StructValidator, ValidationErrors, Violation};
