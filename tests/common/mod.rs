#![allow(dead_code)]

use http::Method;
use routebind::{RequestContext, RouteCallback, RouteTable};

/// Minimal host route table: stores mounted callbacks and replays them
/// against contexts the tests assemble by hand, the way a host framework
/// would after matching a route.
#[derive(Default)]
pub struct TestRouteTable {
    routes: Vec<(Method, String, RouteCallback)>,
}

impl RouteTable for TestRouteTable {
    fn mount(&mut self, method: Method, path: &str, callback: RouteCallback) {
        self.routes.push((method, path.to_string(), callback));
    }
}

impl TestRouteTable {
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Invoke the callback mounted under the given method and pattern.
    /// Returns false when nothing matches.
    pub fn dispatch(&self, method: &Method, pattern: &str, ctx: &mut RequestContext) -> bool {
        for (m, p, callback) in &self.routes {
            if m == method && p == pattern {
                callback(ctx);
                return true;
            }
        }
        false
    }

    /// Invoke a mounted callback by registration index, for tests that
    /// mount the same method/pattern pair more than once.
    pub fn dispatch_nth(&self, index: usize, ctx: &mut RequestContext) {
        (self.routes[index].2)(ctx);
    }
}
