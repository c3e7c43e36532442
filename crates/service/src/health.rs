//! Health reporting.

use serde::{Deserialize, Serialize};

/// Lifecycle position of the managed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    /// `load()` has not run yet.
    Uninitialized,
    /// No trained model is available.
    Untrained,
    /// A trained model is installed and serving predictions.
    Trained,
}

/// Overall service status. The report itself never fails; `Degraded` means
/// the process is alive but cannot serve predictions yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Snapshot returned by the `health` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub model_state: ModelState,
    pub uptime_seconds: u64,
    pub version: String,
}

impl HealthReport {
    pub fn new(model_state: ModelState, uptime_seconds: u64) -> Self {
        let status = match model_state {
            ModelState::Trained => HealthStatus::Healthy,
            _ => HealthStatus::Degraded,
        };
        Self {
            status,
            model_state,
            uptime_seconds,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trained_state_is_healthy() {
        let report = HealthReport::new(ModelState::Trained, 10);
        assert_eq!(report.status, HealthStatus::Healthy);
    }

    #[test]
    fn untrained_states_are_degraded() {
        for state in [ModelState::Uninitialized, ModelState::Untrained] {
            let report = HealthReport::new(state, 0);
            assert_eq!(report.status, HealthStatus::Degraded);
        }
    }

    #[test]
    fn report_serializes_with_lowercase_tags() {
        let report = HealthReport::new(ModelState::Trained, 5);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"model_state\":\"trained\""));
    }
}
