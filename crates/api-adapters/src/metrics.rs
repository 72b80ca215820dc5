//! Request counters in Prometheus/OpenMetrics text form.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
struct HttpLabels {
    method: String,
    /// Route template, not the concrete path, to keep cardinality bounded.
    route: String,
    status: String,
}

pub struct Metrics {
    registry: Registry,
    http_requests: Family<HttpLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let http_requests = Family::<HttpLabels, Counter>::default();
        registry.register(
            "http_requests",
            "HTTP requests handled, by method, route and status",
            http_requests.clone(),
        );
        Self {
            registry,
            http_requests,
        }
    }

    pub fn record(&self, method: &str, route: &str, status: u16) {
        self.http_requests
            .get_or_create(&HttpLabels {
                method: method.to_string(),
                route: route.to_string(),
                status: status.to_string(),
            })
            .inc();
    }

    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_route_template() {
        let metrics = Metrics::new();
        metrics.record("GET", "/api/articles/{slug}", 200);
        metrics.record("GET", "/api/articles/{slug}", 200);
        metrics.record("POST", "/api/users", 422);

        let text = metrics.encode().unwrap();
        assert!(text.contains(
            r#"http_requests_total{method="GET",route="/api/articles/{slug}",status="200"} 2"#
        ));
        assert!(text.contains(
            r#"http_requests_total{method="POST",route="/api/users",status="422"} 1"#
        ));
        assert!(text.ends_with("# EOF\n"));
    }
}
