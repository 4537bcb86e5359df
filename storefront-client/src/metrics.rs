use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::{ClientError, ClientResult};

#[derive(Clone)]
pub struct ClientMetrics {
    registry: Registry,
    requests: IntCounterVec,
    evictions: IntCounterVec,
    unauthorized_ignored: IntCounter,
}

impl ClientMetrics {
    pub fn new() -> ClientResult<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "storefront_requests_total",
                "Outbound API requests grouped by the credential slot attached",
            ),
            &["credential"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let evictions = IntCounterVec::new(
            Opts::new(
                "storefront_credential_evictions_total",
                "Credentials removed after the API answered 401",
            ),
            &["slot"],
        )?;
        registry.register(Box::new(evictions.clone()))?;

        let unauthorized_ignored = IntCounter::new(
            "storefront_unauthorized_ignored_total",
            "401 responses received on pages outside any module",
        )?;
        registry.register(Box::new(unauthorized_ignored.clone()))?;

        Ok(Self {
            registry,
            requests,
            evictions,
            unauthorized_ignored,
        })
    }

    pub fn request(&self, credential: &str) {
        self.requests.with_label_values(&[credential]).inc();
    }

    pub fn credential_evicted(&self, slot: &str) {
        self.evictions.with_label_values(&[slot]).inc();
    }

    pub fn unauthorized_ignored(&self) {
        self.unauthorized_ignored.inc();
    }

    pub fn render(&self) -> ClientResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|_| ClientError::MetricsEncoding)
    }
}
