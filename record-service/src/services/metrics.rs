//! Metrics collection and Prometheus export.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::{Once, OnceLock};

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

static INIT_METRICS: Once = Once::new();

pub const RECORDS_INSERTED_TOTAL: &str = "records_inserted_total";
pub const RECORDS_LISTED_TOTAL: &str = "records_listed_total";

/// Installs the global recorder exactly once. Later and concurrent callers
/// wait for the first install and see its outcome.
pub fn init_metrics() -> Result<(), AppError> {
    let mut outcome = Ok(());
    INIT_METRICS.call_once(|| outcome = install_recorder());
    outcome?;

    match METRICS_HANDLE.get() {
        Some(_) => Ok(()),
        None => Err(AppError::InternalError(anyhow::anyhow!(
            "Prometheus recorder failed to install"
        ))),
    }
}

fn install_recorder() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;
    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::InternalError(anyhow::anyhow!("metrics handle already initialized"))
    })?;

    metrics::describe_counter!(RECORDS_INSERTED_TOTAL, "Records accepted by POST /data");
    metrics::describe_counter!(RECORDS_LISTED_TOTAL, "Records returned by GET /data");
    Ok(())
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_init_installs_once() {
        let handles: Vec<_> = (0..8).map(|_| thread::spawn(init_metrics)).collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert!(init_metrics().is_ok());

        metrics::counter!(RECORDS_INSERTED_TOTAL).increment(1);
        assert!(get_metrics().contains(RECORDS_INSERTED_TOTAL));
    }
}
