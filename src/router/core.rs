//! Router core module - hot path for request routing.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use crate::schema::EndpointDescriptor;
use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` shared with the compiled template; values are
/// per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request to an endpoint.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched endpoint (Arc to avoid expensive clones)
    pub endpoint: Arc<EndpointDescriptor>,
    /// Path parameters extracted from the URL (e.g., `{item_id}` → `"123"`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of looking up a method and path.
#[derive(Debug, Clone)]
pub enum RouteResolution {
    Matched(RouteMatch),
    /// The path exists under other methods only
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

/// Router that matches requests to registered endpoints.
///
/// Templates are tried in registration order and the first one whose
/// method and path both match wins. Registering the same method and
/// template twice replaces the earlier endpoint in place.
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<Arc<EndpointDescriptor>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router from a list of endpoints.
    #[must_use]
    pub fn from_endpoints(endpoints: impl IntoIterator<Item = EndpointDescriptor>) -> Self {
        let mut router = Self::new();
        for endpoint in endpoints {
            router.insert(endpoint);
        }
        let summary: Vec<String> = router
            .routes
            .iter()
            .take(10)
            .map(|e| e.route_label())
            .collect();
        info!(
            routes_count = router.routes.len(),
            routes_summary = ?summary,
            "Routing table loaded"
        );
        router
    }

    /// Register an endpoint.
    pub fn insert(&mut self, endpoint: EndpointDescriptor) -> Arc<EndpointDescriptor> {
        let endpoint = Arc::new(endpoint);
        if let Some(slot) = self
            .routes
            .iter_mut()
            .find(|e| e.method == endpoint.method && e.path.as_str() == endpoint.path.as_str())
        {
            warn!(
                route = %endpoint.route_label(),
                replaced = %slot.name,
                handler = %endpoint.name,
                "Replacing previously registered endpoint"
            );
            *slot = Arc::clone(&endpoint);
        } else {
            debug!(route = %endpoint.route_label(), handler = %endpoint.name, "Registered endpoint");
            self.routes.push(Arc::clone(&endpoint));
        }
        endpoint
    }

    /// Registered endpoints in match order.
    #[must_use]
    pub fn endpoints(&self) -> &[Arc<EndpointDescriptor>] {
        &self.routes
    }

    /// Look up an endpoint by its handler name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<EndpointDescriptor>> {
        self.routes.iter().find(|e| e.name == name)
    }

    /// Resolve a request, distinguishing unknown paths from wrong methods.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> RouteResolution {
        let match_start = std::time::Instant::now();
        let mut allowed: Vec<Method> = Vec::new();

        for endpoint in &self.routes {
            if endpoint.method != *method {
                if endpoint.path.matches(path) && !allowed.contains(&endpoint.method) {
                    allowed.push(endpoint.method.clone());
                }
                continue;
            }
            if let Some(path_params) = endpoint.path.extract(path) {
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %endpoint.name,
                    route_pattern = %endpoint.path,
                    path_params = ?path_params,
                    duration_us = match_start.elapsed().as_micros(),
                    "Route matched"
                );
                return RouteResolution::Matched(RouteMatch {
                    endpoint: Arc::clone(endpoint),
                    path_params,
                });
            }
        }

        if allowed.is_empty() {
            debug!(method = %method, path = %path, "No route matched");
            RouteResolution::NotFound
        } else {
            debug!(method = %method, path = %path, allowed = ?allowed, "Method not allowed");
            RouteResolution::MethodNotAllowed { allowed }
        }
    }

    /// Match a request, ignoring why a miss happened.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        match self.resolve(method, path) {
            RouteResolution::Matched(m) => Some(m),
            _ => None,
        }
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for endpoint in &self.routes {
            println!("[route] {} -> {}", endpoint.route_label(), endpoint.name);
        }
    }
}
