//! encode → scale → predict → resolve.
//!
//! The pipeline owns its two artifacts and is built once at startup; request
//! handlers share it behind an `Arc` and only ever read from it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::features::{self, FeatureVector, MatchInput, Team};
use crate::model::{
    ClassLabel, Classifier, ClassifierArtifact, Scaler, ScalerArtifact, WinnerConvention,
};

/// Outcome of one prediction, handed straight to the form page.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub label: u8,
    pub winner: Team,
    /// Classifier probability of `label`
    pub probability: f64,
    pub raw_features: FeatureVector,
    pub scaled_features: FeatureVector,
    pub predicted_at: DateTime<Utc>,
}

pub struct PredictionPipeline {
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
    convention: WinnerConvention,
}

impl PredictionPipeline {
    pub fn new(
        scaler: Box<dyn Scaler>,
        classifier: Box<dyn Classifier>,
        convention: WinnerConvention,
    ) -> Self {
        PredictionPipeline {
            scaler,
            classifier,
            convention,
        }
    }

    /// Load both artifacts from disk and wire them together.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        scaler_path: P,
        model_path: Q,
    ) -> Result<Self, PipelineError> {
        let scaler = ScalerArtifact::load(&scaler_path)?;
        info!(
            "Loaded {} ({} features) from {}",
            scaler.name(),
            scaler.n_features(),
            scaler_path.as_ref().display()
        );

        let classifier = ClassifierArtifact::load(&model_path)?;
        let convention = classifier.winner_convention();
        match classifier.label_one_means {
            Some(c) => info!("Model records label 1 as {:?}", c),
            None => warn!(
                "Model does not record what label 1 means; assuming {:?} (unverified)",
                convention
            ),
        }
        info!(
            "Loaded {} from {}",
            classifier.name(),
            model_path.as_ref().display()
        );

        Ok(PredictionPipeline::new(
            Box::new(scaler),
            Box::new(classifier),
            convention,
        ))
    }

    pub fn encode(&self, input: &MatchInput) -> FeatureVector {
        features::encode(input)
    }

    pub fn scale(&self, raw: &FeatureVector) -> Result<FeatureVector, PipelineError> {
        self.scaler.transform(raw)
    }

    pub fn predict(&self, scaled: &FeatureVector) -> Result<ClassLabel, PipelineError> {
        self.classifier.predict(scaled)
    }

    pub fn convention(&self) -> WinnerConvention {
        self.convention
    }

    pub fn scaler_name(&self) -> &str {
        self.scaler.name()
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Run the whole chain for one match. Any stage failure aborts the request.
    pub fn run(&self, input: &MatchInput) -> Result<PredictionResult, PipelineError> {
        let raw = self.encode(input);
        debug!("raw features: {:?}", raw.values());

        let scaled = self.scale(&raw)?;
        debug!("scaled features: {:?}", scaled.values());

        let (label, proba) = self.classifier.predict_with_proba(&scaled)?;
        let winner = self.convention.resolve(label, input.team1, input.team2);

        info!(
            "{} vs {} at {}: label={} winner={} (p={:.3})",
            input.team1,
            input.team2,
            input.venue,
            label.as_u8(),
            winner,
            proba[label.index()]
        );

        Ok(PredictionResult {
            label: label.as_u8(),
            winner,
            probability: proba[label.index()],
            raw_features: raw,
            scaled_features: scaled,
            predicted_at: Utc::now(),
        })
    }
}

/// Default mapping: class 1 means team1 won, class 0 means team2 won.
pub fn resolve_winner(label: ClassLabel, team1: Team, team2: Team) -> Team {
    match label {
        ClassLabel::One => team1,
        ClassLabel::Zero => team2,
    }
}
