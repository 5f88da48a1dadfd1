use shared::metrics_defs::{MetricDef, MetricType};

pub const UPLINKS_ACCEPTED: MetricDef = MetricDef {
    name: "uplink.accepted",
    metric_type: MetricType::Counter,
    description: "Accepted uplinks. Tagged with source (gnss|here).",
};

pub const UPLINKS_REJECTED: MetricDef = MetricDef {
    name: "uplink.rejected",
    metric_type: MetricType::Counter,
    description: "Rejected uplinks. Tagged with the failing stage.",
};

pub const RESOLVE_DURATION: MetricDef = MetricDef {
    name: "uplink.resolve.duration",
    metric_type: MetricType::Timer,
    description: "Time to resolve a fix in milliseconds. Tagged with source.",
};

pub const STORE_DURATION: MetricDef = MetricDef {
    name: "uplink.store.duration",
    metric_type: MetricType::Timer,
    description: "Time to persist a resolved fix in milliseconds.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    UPLINKS_ACCEPTED,
    UPLINKS_REJECTED,
    RESOLVE_DURATION,
    STORE_DURATION,
];
