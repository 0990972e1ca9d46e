use serde_json::{json, Value};

use crate::context::RequestContext;
use crate::dispatch::Outcome;
use crate::envelope::Envelope;
use crate::materializer::BindError;

pub type BindingErrorHook = Box<dyn Fn(&mut RequestContext, &BindError) + Send + Sync>;
pub type HandlerErrorHook = Box<dyn Fn(&mut RequestContext, &anyhow::Error) + Send + Sync>;
pub type SuccessHook = Box<dyn Fn(&mut RequestContext, Option<Value>) + Send + Sync>;

/// The three per-outcome hooks. Each is replaceable on the builder; each
/// has a built-in default; exactly one fires per request. Hooks are the
/// only place a response is produced.
pub struct HookSet {
    pub(crate) on_binding_error: BindingErrorHook,
    pub(crate) on_handler_error: HandlerErrorHook,
    pub(crate) on_success: SuccessHook,
}

impl Default for HookSet {
    fn default() -> Self {
        Self {
            on_binding_error: Box::new(|ctx, err| {
                ctx.abort_with(
                    400,
                    json!({"error": "invalid request", "message": err.to_string()}),
                );
            }),
            on_handler_error: Box::new(|ctx, err| {
                ctx.abort_with(
                    500,
                    json!({"error": "internal error", "message": err.to_string()}),
                );
            }),
            on_success: Box::new(|ctx, data| {
                ctx.respond(200, Envelope::success(data).to_value());
            }),
        }
    }
}

impl HookSet {
    pub(crate) fn fire(&self, ctx: &mut RequestContext, outcome: Outcome) {
        match outcome {
            Outcome::BindingFailure(err) => (self.on_binding_error)(ctx, &err),
            Outcome::HandlerFailure(err) => (self.on_handler_error)(ctx, &err),
            Outcome::Success(data) => (self.on_success)(ctx, data),
        }
    }
}
