//! End-to-end dispatch tests: mount typed handlers on a stand-in host
//! table, replay hand-built contexts through the mounted callbacks, and
//! assert which hook fired and what it saw.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use routebind::{Bindable, Dispatcher, RequestContext};

mod common;
use common::TestRouteTable;

#[derive(Debug, Deserialize, Bindable)]
struct ItemRequest {
    #[bind(path)]
    id: String,
    #[bind(header)]
    token: String,
}

#[derive(Debug, Serialize)]
struct ItemResponse {
    id: String,
}

struct Hooks {
    binding_errors: Arc<AtomicUsize>,
    handler_errors: Arc<AtomicUsize>,
    successes: Arc<AtomicUsize>,
    last_payload: Arc<Mutex<Option<Option<Value>>>>,
    last_error: Arc<Mutex<Option<String>>>,
}

/// Dispatcher whose hooks count invocations and record what they saw, on
/// top of the default response behavior.
fn counting_dispatcher() -> (Dispatcher, Hooks) {
    let hooks = Hooks {
        binding_errors: Arc::new(AtomicUsize::new(0)),
        handler_errors: Arc::new(AtomicUsize::new(0)),
        successes: Arc::new(AtomicUsize::new(0)),
        last_payload: Arc::new(Mutex::new(None)),
        last_error: Arc::new(Mutex::new(None)),
    };
    let dispatcher = Dispatcher::builder()
        .on_binding_error({
            let count = hooks.binding_errors.clone();
            move |ctx, err| {
                count.fetch_add(1, Ordering::SeqCst);
                ctx.abort_with(400, json!({"message": err.to_string()}));
            }
        })
        .on_handler_error({
            let count = hooks.handler_errors.clone();
            let last_error = hooks.last_error.clone();
            move |ctx, err| {
                count.fetch_add(1, Ordering::SeqCst);
                *last_error.lock().unwrap() = Some(err.to_string());
                ctx.abort_with(500, json!({"message": err.to_string()}));
            }
        })
        .on_success({
            let count = hooks.successes.clone();
            let last_payload = hooks.last_payload.clone();
            move |ctx, data| {
                count.fetch_add(1, Ordering::SeqCst);
                *last_payload.lock().unwrap() = Some(data.clone());
                ctx.respond(200, data.unwrap_or(Value::Null));
            }
        })
        .build();
    (dispatcher, hooks)
}

fn total(hooks: &Hooks) -> usize {
    hooks.binding_errors.load(Ordering::SeqCst)
        + hooks.handler_errors.load(Ordering::SeqCst)
        + hooks.successes.load(Ordering::SeqCst)
}

#[test]
fn materialized_request_reaches_handler_and_success_hook_sees_no_payload() {
    let (dispatcher, hooks) = counting_dispatcher();
    let mut table = TestRouteTable::default();

    let handler_calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(None));
    dispatcher.get(&mut table, "/items/{id}", {
        let handler_calls = handler_calls.clone();
        let seen = seen.clone();
        move |_ctx: &mut RequestContext,
              req: ItemRequest|
              -> anyhow::Result<Option<ItemResponse>> {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            *seen.lock().unwrap() = Some((req.id, req.token));
            Ok(None)
        }
    });

    let mut ctx = RequestContext::builder(Method::GET, "/items/42")
        .path_param("id", "42")
        .header("token", "abc")
        .build();
    assert!(table.dispatch(&Method::GET, "/items/{id}", &mut ctx));

    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        seen.lock().unwrap().take(),
        Some(("42".to_string(), "abc".to_string()))
    );
    assert_eq!(hooks.successes.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.last_payload.lock().unwrap().take(), Some(None));
    assert_eq!(total(&hooks), 1);
    assert_eq!(ctx.take_response().unwrap().status, 200);
}

#[test]
fn missing_header_is_a_binding_failure_and_handler_never_runs() {
    let (dispatcher, hooks) = counting_dispatcher();
    let mut table = TestRouteTable::default();

    let handler_calls = Arc::new(AtomicUsize::new(0));
    dispatcher.get(&mut table, "/items/{id}", {
        let handler_calls = handler_calls.clone();
        move |_ctx: &mut RequestContext,
              _req: ItemRequest|
              -> anyhow::Result<Option<ItemResponse>> {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    });

    let mut ctx = RequestContext::builder(Method::GET, "/items/42")
        .path_param("id", "42")
        .build();
    table.dispatch(&Method::GET, "/items/{id}", &mut ctx);

    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
    assert_eq!(hooks.binding_errors.load(Ordering::SeqCst), 1);
    assert_eq!(total(&hooks), 1);
    let parts = ctx.take_response().unwrap();
    assert_eq!(parts.status, 400);
    assert!(parts.body["message"].as_str().unwrap().contains("token"));
}

#[test]
fn handler_error_routes_to_handler_error_hook_only() {
    let (dispatcher, hooks) = counting_dispatcher();
    let mut table = TestRouteTable::default();

    let failing = |_ctx: &mut RequestContext| -> anyhow::Result<Option<ItemResponse>> {
        Err(anyhow::anyhow!("boom"))
    };
    dispatcher.post(&mut table, "/things", failing);

    let mut ctx = RequestContext::builder(Method::POST, "/things").build();
    table.dispatch(&Method::POST, "/things", &mut ctx);

    assert_eq!(hooks.handler_errors.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.successes.load(Ordering::SeqCst), 0);
    assert_eq!(total(&hooks), 1);
    assert_eq!(hooks.last_error.lock().unwrap().take(), Some("boom".to_string()));
    assert_eq!(ctx.take_response().unwrap().status, 500);
}

#[test]
fn bare_handler_shape_dispatches() {
    let (dispatcher, hooks) = counting_dispatcher();
    let mut table = TestRouteTable::default();

    dispatcher.get(&mut table, "/health", |ctx: &mut RequestContext| -> anyhow::Result<()> {
        assert_eq!(ctx.path, "/health");
        Ok(())
    });

    let mut ctx = RequestContext::builder(Method::GET, "/health").build();
    table.dispatch(&Method::GET, "/health", &mut ctx);
    assert_eq!(hooks.successes.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.last_payload.lock().unwrap().take(), Some(None));
}

#[test]
fn payload_shape_serializes_response() {
    let (dispatcher, hooks) = counting_dispatcher();
    let mut table = TestRouteTable::default();

    let fixed = |_ctx: &mut RequestContext| -> anyhow::Result<Option<ItemResponse>> {
        Ok(Some(ItemResponse {
            id: "1234".to_string(),
        }))
    };
    dispatcher.get(&mut table, "/fixed", fixed);

    let mut ctx = RequestContext::builder(Method::GET, "/fixed").build();
    table.dispatch(&Method::GET, "/fixed", &mut ctx);

    assert_eq!(
        hooks.last_payload.lock().unwrap().take(),
        Some(Some(json!({"id": "1234"})))
    );
}

#[test]
fn default_hooks_produce_envelope_and_status_codes() {
    let dispatcher = Dispatcher::new();
    let mut table = TestRouteTable::default();

    let ok = |_ctx: &mut RequestContext| -> anyhow::Result<Option<ItemResponse>> {
        Ok(Some(ItemResponse {
            id: "7".to_string(),
        }))
    };
    dispatcher.get(&mut table, "/ok", ok);
    let fail =
        |_ctx: &mut RequestContext| -> anyhow::Result<()> { Err(anyhow::anyhow!("broken")) };
    dispatcher.get(&mut table, "/fail", fail);

    let mut ctx = RequestContext::builder(Method::GET, "/ok").build();
    table.dispatch(&Method::GET, "/ok", &mut ctx);
    let parts = ctx.take_response().unwrap();
    assert_eq!(parts.status, 200);
    assert_eq!(
        parts.body,
        json!({"code": 0, "message": "success", "data": {"id": "7"}})
    );

    let mut ctx = RequestContext::builder(Method::GET, "/fail").build();
    table.dispatch(&Method::GET, "/fail", &mut ctx);
    let parts = ctx.take_response().unwrap();
    assert_eq!(parts.status, 500);
    assert_eq!(parts.body["error"], json!("internal error"));
    assert!(ctx.is_aborted());
}

#[test]
fn duplicate_registration_mounts_two_independent_callbacks() {
    let (dispatcher, hooks) = counting_dispatcher();
    let mut table = TestRouteTable::default();

    for _ in 0..2 {
        dispatcher.get(&mut table, "/dup", |_ctx: &mut RequestContext| -> anyhow::Result<()> {
            Ok(())
        });
    }
    assert_eq!(table.len(), 2);

    let mut ctx = RequestContext::builder(Method::GET, "/dup").build();
    table.dispatch_nth(0, &mut ctx);
    table.dispatch_nth(1, &mut ctx);
    assert_eq!(hooks.successes.load(Ordering::SeqCst), 2);
}

#[derive(Debug, Deserialize, Bindable)]
struct UnboundTagRequest {
    #[bind(msgpack)]
    payload: String,
}

#[test]
#[should_panic(expected = "no decoder is registered")]
fn mounting_a_handler_with_an_unregistered_tag_panics() {
    let dispatcher = Dispatcher::new();
    let mut table = TestRouteTable::default();
    let handler =
        |_ctx: &mut RequestContext, _req: UnboundTagRequest| -> anyhow::Result<()> { Ok(()) };
    dispatcher.post(&mut table, "/blobs", handler);
}
