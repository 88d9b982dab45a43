//! Metric definitions for the FreightPay service.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

pub const SEARCH_REQUESTS: MetricDef = MetricDef {
    name: "search.requests",
    metric_type: MetricType::Counter,
    description: "Single-term search requests. Tagged with type.",
};

pub const BULK_REQUESTS: MetricDef = MetricDef {
    name: "search.bulk.requests",
    metric_type: MetricType::Counter,
    description: "Bulk search requests. Tagged with type.",
};

pub const TRIGGER_REQUESTS: MetricDef = MetricDef {
    name: "trigger.requests",
    metric_type: MetricType::Counter,
    description: "Trigger dispatch requests. Tagged with trigger.",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with handler.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    SEARCH_REQUESTS,
    BULK_REQUESTS,
    TRIGGER_REQUESTS,
    REQUEST_DURATION,
];
