use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("shad_manager_statds")
        .with_description("Shad manager billing statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: &str, value: String) {
    STATDS.add(1, &[KeyValue::new(metric.to_string(), value)]);
}

pub fn incr_pix_payload_statds(source: &str) {
    incr_statds("pix_payload", source.into())
}

pub fn incr_payment_statds(method: &str) {
    incr_statds("manual_payment", method.into())
}

pub fn incr_collection_statds(channel: &str) {
    incr_statds("collection", channel.into())
}

pub fn incr_invoice_job_statds(job: &str) {
    incr_statds("invoice_job", job.into())
}
