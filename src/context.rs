use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;

use crate::ids::RequestId;

/// Maximum inline path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers/cookies before heap allocation. Most requests
/// carry well under 16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated parameter storage. Keys use `Arc<str>` because parameter
/// names repeat across requests while values are per-request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Stack-allocated header/cookie storage.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// The adapter's view of one incoming request, built by host-framework glue
/// and handed to every handler as its first argument.
///
/// The host owns transport and routing; this type only carries what the
/// binding and dispatch layers need: the matched path parameters, query
/// parameters, headers, cookies, the parsed JSON body (when present), and
/// the response slot the outcome hooks write into.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique id for correlation; adopted from the host or freshly minted.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Request path as matched by the host router.
    pub path: String,
    /// Path parameters extracted by the host's route match.
    pub path_params: ParamVec,
    /// Query string parameters.
    pub query_params: ParamVec,
    /// Headers, matched case-insensitively.
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header.
    pub cookies: HeaderVec,
    /// Request body parsed as JSON, if the host glue parsed one.
    pub body: Option<Value>,
    response: Option<ResponseParts>,
    aborted: bool,
}

/// What a hook decided the response should be. The host glue renders this
/// onto its own response type; the adapter never writes to the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseParts {
    pub status: u16,
    pub body: Value,
}

impl RequestContext {
    pub fn builder(method: Method, path: impl Into<String>) -> ContextBuilder {
        ContextBuilder {
            method,
            path: path.into(),
            request_id: None,
            path_params: ParamVec::new(),
            query_params: ParamVec::new(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            body: None,
        }
    }

    /// Last occurrence wins for repeated parameters.
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Last occurrence wins for repeated parameters.
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive per RFC 7230.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Path parameters as a name → values multimap, the shape the path
    /// decoder consumes.
    pub fn path_values(&self) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::with_capacity(self.path_params.len());
        for (k, v) in &self.path_params {
            map.entry(k.to_string()).or_default().push(v.clone());
        }
        map
    }

    /// Record a response. A later write replaces an earlier one.
    pub fn respond(&mut self, status: u16, body: Value) {
        self.response = Some(ResponseParts { status, body });
    }

    /// Record an error response and mark the request aborted so host glue
    /// can skip any remaining per-request work.
    pub fn abort_with(&mut self, status: u16, body: Value) {
        self.aborted = true;
        self.respond(status, body);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn response(&self) -> Option<&ResponseParts> {
        self.response.as_ref()
    }

    pub fn take_response(&mut self) -> Option<ResponseParts> {
        self.response.take()
    }
}

/// Builder used by host glue (and tests) to assemble a context.
#[derive(Debug)]
pub struct ContextBuilder {
    method: Method,
    path: String,
    request_id: Option<RequestId>,
    path_params: ParamVec,
    query_params: ParamVec,
    headers: HeaderVec,
    cookies: HeaderVec,
    body: Option<Value>,
}

impl ContextBuilder {
    pub fn request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_params.push((Arc::from(name), value.into()));
        self
    }

    pub fn query_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query_params.push((Arc::from(name), value.into()));
        self
    }

    /// Parse and append an entire query string.
    pub fn query_string(mut self, query: &str) -> Self {
        self.query_params.extend(parse_query(query));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    pub fn cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.push((Arc::from(name), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> RequestContext {
        let request_id = self.request_id.unwrap_or_else(|| {
            let from_header = self
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("x-request-id"))
                .map(|(_, v)| v.as_str());
            RequestId::from_header_or_new(from_header)
        });
        RequestContext {
            request_id,
            method: self.method,
            path: self.path,
            path_params: self.path_params,
            query_params: self.query_params,
            headers: self.headers,
            cookies: self.cookies,
            body: self.body,
            response: None,
            aborted: false,
        }
    }
}

/// Parse a query string (`a=1&b=two`, already stripped of the leading `?`)
/// into URL-decoded pairs.
pub fn parse_query(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.to_string()))
        .collect()
}

/// Parse a `Cookie` header value into name/value pairs.
pub fn parse_cookie_header(value: &str) -> HeaderVec {
    value
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((Arc::from(name), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeated_params_last_occurrence_wins() {
        let ctx = RequestContext::builder(Method::GET, "/items")
            .query_param("tag", "a")
            .query_param("tag", "b")
            .build();
        assert_eq!(ctx.get_query_param("tag"), Some("b"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let ctx = RequestContext::builder(Method::GET, "/")
            .header("X-Token", "abc")
            .build();
        assert_eq!(ctx.get_header("x-token"), Some("abc"));
    }

    #[test]
    fn path_values_groups_repeated_names() {
        let ctx = RequestContext::builder(Method::GET, "/a/1/b/2")
            .path_param("seg", "1")
            .path_param("seg", "2")
            .build();
        let values = ctx.path_values();
        assert_eq!(values["seg"], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn parse_query_decodes_pairs() {
        let params = parse_query("limit=10&name=a%20b");
        assert_eq!(params[0], (Arc::from("limit"), "10".to_string()));
        assert_eq!(params[1], (Arc::from("name"), "a b".to_string()));
    }

    #[test]
    fn parse_cookie_header_splits_pairs() {
        let cookies = parse_cookie_header("session=xyz; theme=dark");
        assert_eq!(cookies[0], (Arc::from("session"), "xyz".to_string()));
        assert_eq!(cookies[1], (Arc::from("theme"), "dark".to_string()));
    }

    #[test]
    fn abort_records_response_and_flag() {
        let mut ctx = RequestContext::builder(Method::GET, "/").build();
        ctx.abort_with(400, json!({"error": "invalid request"}));
        assert!(ctx.is_aborted());
        let parts = ctx.take_response().unwrap();
        assert_eq!(parts.status, 400);
        assert!(ctx.take_response().is_none());
    }

    #[test]
    fn builder_adopts_request_id_header() {
        let id = RequestId::new();
        let ctx = RequestContext::builder(Method::GET, "/")
            .header("X-Request-Id", id.to_string())
            .build();
        assert_eq!(ctx.request_id, id);
    }
}
