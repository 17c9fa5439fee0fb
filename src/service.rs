use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Response of the remote benchmarking operation, named as the service encodes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Execution time measured by the service. Zero means negligible.
    #[serde(rename = "total_time_ns", default)]
    pub service_elapsed_ns: u64,
    #[serde(rename = "quantum_resistant")]
    pub is_resistant: bool,
    #[serde(rename = "success")]
    pub succeeded: bool,
    pub message_length: u64,
}

/// The remote service that signs and verifies `message` with `algorithm` and reports how long it
/// took.
#[async_trait]
pub trait BenchmarkService: Send + Sync {
    async fn benchmark(
        &self,
        message: &[u8],
        algorithm: &str,
    ) -> Result<BenchmarkReport, ServiceError>;
}

#[async_trait]
impl<T> BenchmarkService for std::sync::Arc<T>
where
    T: BenchmarkService + ?Sized,
{
    async fn benchmark(
        &self,
        message: &[u8],
        algorithm: &str,
    ) -> Result<BenchmarkReport, ServiceError> {
        (**self).benchmark(message, algorithm).await
    }
}

#[cfg(test)]
mod test {
    use super::BenchmarkReport;

    #[test]
    fn decode_wire_report() {
        let report: BenchmarkReport = serde_json::from_str(
            r#"{"algorithm":"falcon","total_time_ns":1843000,"quantum_resistant":true,"success":true,"message_length":1000}"#,
        )
        .unwrap();
        assert_eq!(report.algorithm.as_deref(), Some("falcon"));
        assert_eq!(report.service_elapsed_ns, 1_843_000);
        assert!(report.is_resistant);
        assert!(report.succeeded);
        assert_eq!(report.message_length, 1000);
    }

    #[test]
    fn missing_service_time_is_negligible() {
        let report: BenchmarkReport = serde_json::from_str(
            r#"{"quantum_resistant":false,"success":true,"message_length":12}"#,
        )
        .unwrap();
        assert_eq!(report.service_elapsed_ns, 0);
        assert_eq!(report.algorithm, None);
    }
}
