use cadence::{Counted, MetricError, StatsdClient, Timed, UdpMetricSink};
use std::net::UdpSocket;
use std::sync::Arc;

enum MetricsBackend {
    Statsd(StatsdClient),
    Noop,
}

/// StatsD metrics client shared by all services.
///
/// Cheap to clone; all clones send to the same sink. Metric sends are
/// fire-and-forget: a failed send is logged and dropped, never surfaced
/// to the request path.
#[derive(Clone)]
pub struct Metrics {
    backend: Arc<MetricsBackend>,
}

impl Metrics {
    /// Create a Metrics client that sends to StatsD over UDP.
    pub fn new(statsd_host: &str, statsd_port: u16, prefix: &str) -> Result<Self, MetricError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;

        let addr = format!("{statsd_host}:{statsd_port}");
        let sink = UdpMetricSink::from(addr, socket)?;
        let client = StatsdClient::from_sink(prefix, sink);

        Ok(Metrics {
            backend: Arc::new(MetricsBackend::Statsd(client)),
        })
    }

    /// Create a no-op Metrics client that discards all metrics.
    pub fn new_noop() -> Self {
        Metrics {
            backend: Arc::new(MetricsBackend::Noop),
        }
    }

    /// Increment a counter by 1. An empty tag slice sends an untagged metric.
    ///
    /// `metrics.incr("uplink.accepted", &[("source", "gnss")]);`
    pub fn incr(&self, metric: &str, tags: &[(&str, &str)]) {
        let client = match self.backend.as_ref() {
            MetricsBackend::Statsd(client) => client,
            MetricsBackend::Noop => return,
        };

        let result = if tags.is_empty() {
            client.count(metric, 1)
        } else {
            let mut counter = client.count_with_tags(metric, 1);
            for (key, value) in tags {
                counter = counter.with_tag(key, value);
            }
            counter.try_send()
        };

        if let Err(e) = result {
            tracing::warn!(metric, error = %e, "failed to send counter");
        }
    }

    /// Record a timing in milliseconds. An empty tag slice sends an untagged metric.
    ///
    /// `metrics.timing("uplink.resolve.duration", 42, &[("source", "here")]);`
    pub fn timing(&self, metric: &str, value_ms: u64, tags: &[(&str, &str)]) {
        let client = match self.backend.as_ref() {
            MetricsBackend::Statsd(client) => client,
            MetricsBackend::Noop => return,
        };

        let result = if tags.is_empty() {
            client.time(metric, value_ms)
        } else {
            let mut timer = client.time_with_tags(metric, value_ms);
            for (key, value) in tags {
                timer = timer.with_tag(key, value);
            }
            timer.try_send()
        };

        if let Err(e) = result {
            tracing::warn!(metric, error = %e, "failed to send timing");
        }
    }
}
