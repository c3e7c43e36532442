//! Model lifecycle manager.
//!
//! Owns the model state machine (`Uninitialized -> Untrained -> Trained`)
//! and the four public operations: `load`, `train`, `predict`, `health`.
//! Readers share the lock; training fits the forest outside the lock and
//! takes the write guard only to persist and swap.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use glucast_core::{
    build_features, from_micro, ArtifactStore, ForestModel, GlucoseRecord, MealEncoder,
    Prediction, Regressor, TrainReport,
};
use glucast_trainer::{Dataset, ForestTrainer};
use parking_lot::RwLock;
use tracing::info;

use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::health::{HealthReport, ModelState};

/// The installed model together with the encoder it was trained with.
struct TrainedState {
    model: ForestModel,
    encoder: MealEncoder,
}

enum ManagerState {
    Uninitialized,
    Untrained,
    Trained(TrainedState),
}

impl ManagerState {
    fn model_state(&self) -> ModelState {
        match self {
            ManagerState::Uninitialized => ModelState::Uninitialized,
            ManagerState::Untrained => ModelState::Untrained,
            ManagerState::Trained(_) => ModelState::Trained,
        }
    }
}

pub struct ModelManager {
    config: ServiceConfig,
    store: ArtifactStore,
    encoder: MealEncoder,
    state: Arc<RwLock<ManagerState>>,
    started_at: Instant,
}

impl ModelManager {
    /// Creates a manager in the `Uninitialized` state. Call [`load`] once
    /// before serving traffic.
    ///
    /// [`load`]: ModelManager::load
    pub fn new(config: ServiceConfig) -> Self {
        let store = ArtifactStore::new(&config.model_path, &config.encoder_path);
        Self {
            config,
            store,
            encoder: MealEncoder::standard(),
            state: Arc::new(RwLock::new(ManagerState::Uninitialized)),
            started_at: Instant::now(),
        }
    }

    /// Restores the persisted artifact pair, if any.
    ///
    /// Both files present and consistent installs the model (`Trained`);
    /// neither present starts fresh (`Untrained`); anything else is a
    /// persistence error and the manager stays uninitialized.
    pub fn load(&self) -> Result<ModelState, ServiceError> {
        match self.store.load()? {
            Some((model, snapshot)) => {
                let encoder = MealEncoder::from_snapshot(&snapshot)?;
                let mut guard = self.state.write();
                *guard = ManagerState::Trained(TrainedState { model, encoder });
                info!("Restored trained model from disk");
                Ok(ModelState::Trained)
            }
            None => {
                let mut guard = self.state.write();
                *guard = ManagerState::Untrained;
                info!("No persisted model, starting untrained");
                Ok(ModelState::Untrained)
            }
        }
    }

    /// Retrains from scratch on an ordered record sequence, persists the
    /// new artifact pair, and swaps it in.
    ///
    /// The fit runs without holding the lock. Persistence happens under the
    /// write guard before the swap, so any failure leaves both the previous
    /// in-memory model and the previous artifacts intact.
    pub fn train(&self, records: &[GlucoseRecord]) -> Result<TrainReport, ServiceError> {
        let dataset = Dataset::from_records(records, &self.encoder)?;
        let trainer = ForestTrainer::new(self.config.forest.clone());
        let model = trainer.train(&dataset)?;
        let snapshot = self.encoder.snapshot();

        let mut guard = self.state.write();
        let model_hash = self.store.save(&model, &snapshot)?;
        *guard = ManagerState::Trained(TrainedState {
            model,
            encoder: self.encoder.clone(),
        });

        info!(
            records = records.len(),
            examples = dataset.len(),
            hash = %model_hash,
            "Model retrained and installed"
        );

        Ok(TrainReport {
            records: records.len(),
            examples: dataset.len(),
            trained_at: Utc::now(),
            model_hash,
        })
    }

    /// Predicts the next glucose reading for one record.
    pub fn predict(&self, record: &GlucoseRecord) -> Result<Prediction, ServiceError> {
        let guard = self.state.read();
        let trained = match &*guard {
            ManagerState::Trained(trained) => trained,
            _ => return Err(ServiceError::ModelNotReady),
        };

        let features = build_features(record, &trained.encoder)?;
        let micro = trained.model.predict(&features);

        Ok(Prediction {
            predicted_glucose: from_micro(micro),
            confidence: trained.model.confidence(),
        })
    }

    /// Liveness snapshot. Never fails.
    pub fn health(&self) -> HealthReport {
        let model_state = self.state.read().model_state();
        HealthReport::new(model_state, self.started_at.elapsed().as_secs())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModelState {
        self.state.read().model_state()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
