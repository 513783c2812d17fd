use berth_match::feed::source::{BoxFuture, InterestNotice, NotificationSink, NotifyError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Sink used when no upstream contact endpoint is configured. Broker
/// interest lands in the service log instead of an outbound request, so
/// synthetic-only deployments still leave an audit trail.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify_interest<'a>(
        &'a self,
        notice: &'a InterestNotice,
    ) -> BoxFuture<'a, Result<(), NotifyError>> {
        info!(
            boat = %notice.boat_id,
            builder = %notice.builder,
            model = %notice.model,
            member = %notice.contact.email,
            "interest notice recorded in log"
        );
        Box::pin(async { Ok(()) })
    }
}
