use lead_finder::leads::ExportProfile;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_profile(raw: &str) -> Result<ExportProfile, String> {
    ExportProfile::parse(raw)
        .ok_or_else(|| format!("unknown profile '{raw}' (expected contact, standard or extended)"))
}
