//! Health metric recording and summaries

mod service;

#[cfg(test)]
mod tests;

pub use service::{HealthMetricService, MetricChanges, MetricSummary, NewMetric};
