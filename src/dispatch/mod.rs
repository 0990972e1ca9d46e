//! Outcome dispatch: invoke the handler, fold the result into an
//! [`Outcome`], fire exactly one hook.
//!
//! The [`Dispatcher`] is the one configuration object of the crate: it
//! owns the binder registry and the hook set, is assembled once via
//! [`DispatcherBuilder`] before traffic is served, and is shared read-only
//! across request workers afterwards.

mod dispatcher;
mod hooks;

pub use dispatcher::{Dispatcher, DispatcherBuilder, Outcome, RouteCallback, RouteTable};
pub use hooks::HookSet;
