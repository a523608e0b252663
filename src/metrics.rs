use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const SCORED_TOTAL: &str = "polarity_scored_total";
pub const INVALID_INPUT_TOTAL: &str = "polarity_invalid_input_total";
pub const MISSING_INDEX_TOTAL: &str = "polarity_missing_index_total";
pub const SCORE_DURATION_MS: &str = "polarity_score_duration_ms";
pub const TRAINING_DOCUMENTS_TOTAL: &str = "polarity_training_documents_total";
pub const VOCABULARY_SIZE: &str = "polarity_vocabulary_size";
pub const INDEX_RELOADS_TOTAL: &str = "polarity_index_reloads_total";

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and describe series.
    ///
    /// Later calls reuse the same recorder, so several routers in one test
    /// binary share counters.
    pub fn init() -> Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("prometheus: install recorder")?;
                describe();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!(SCORED_TOTAL, "Texts scored successfully.");
    describe_counter!(
        INVALID_INPUT_TOTAL,
        "Scoring requests rejected because the text had no tokens."
    );
    describe_counter!(
        MISSING_INDEX_TOTAL,
        "Scoring requests rejected because no trained index was loaded."
    );
    describe_histogram!(SCORE_DURATION_MS, "Time spent scoring one text (single or batch item), in milliseconds.");
    describe_counter!(
        TRAINING_DOCUMENTS_TOTAL,
        "Documents indexed during training, per label."
    );
    describe_gauge!(VOCABULARY_SIZE, "Distinct words in the current index, per label.");
    describe_counter!(INDEX_RELOADS_TOTAL, "Successful index reloads from disk.");
}
