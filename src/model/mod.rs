//! Capabilities the pipeline consumes from the trained artifacts.
//!
//! The pipeline never looks inside a scaler or a classifier: it hands over a
//! `FeatureVector` and gets one back (or a class). Concrete artifacts loaded
//! from disk live in [`scaler`] and [`classifier`]; tests plug in their own.

pub mod classifier;
pub mod scaler;

pub use classifier::ClassifierArtifact;
pub use scaler::ScalerArtifact;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PipelineError;
use crate::features::{FeatureVector, Team};
use crate::pipeline::resolve_winner;

/// Pre-fitted affine transform applied to the raw features.
pub trait Scaler: Send + Sync {
    fn transform(&self, raw: &FeatureVector) -> Result<FeatureVector, PipelineError>;

    /// Human-readable artifact kind for logging.
    fn name(&self) -> &str;
}

/// Pre-trained binary classifier.
pub trait Classifier: Send + Sync {
    /// Class probabilities `[P(0), P(1)]`.
    fn predict_proba(&self, scaled: &FeatureVector) -> Result<[f64; 2], PipelineError>;

    /// Class together with the probabilities it was read from, in one pass.
    fn predict_with_proba(
        &self,
        scaled: &FeatureVector,
    ) -> Result<(ClassLabel, [f64; 2]), PipelineError> {
        let proba = self.predict_proba(scaled)?;
        Ok((ClassLabel::from_proba(proba), proba))
    }

    fn predict(&self, scaled: &FeatureVector) -> Result<ClassLabel, PipelineError> {
        self.predict_with_proba(scaled).map(|(label, _)| label)
    }

    fn name(&self) -> &str;
}

/// Binary model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLabel {
    Zero,
    One,
}

impl ClassLabel {
    pub fn from_raw(raw: i64) -> Option<ClassLabel> {
        match raw {
            0 => Some(ClassLabel::Zero),
            1 => Some(ClassLabel::One),
            _ => None,
        }
    }

    /// Most probable class; an exact tie goes to class 0.
    pub fn from_proba([p0, p1]: [f64; 2]) -> ClassLabel {
        if p1 > p0 {
            ClassLabel::One
        } else {
            ClassLabel::Zero
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            ClassLabel::Zero => 0,
            ClassLabel::One => 1,
        }
    }

    pub fn index(self) -> usize {
        self.as_u8() as usize
    }
}

/// Which side of the fixture class 1 stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WinnerConvention {
    #[default]
    #[serde(rename = "team1")]
    LabelOneIsTeam1,
    #[serde(rename = "team2")]
    LabelOneIsTeam2,
}

impl WinnerConvention {
    pub fn resolve(self, label: ClassLabel, team1: Team, team2: Team) -> Team {
        match self {
            WinnerConvention::LabelOneIsTeam1 => resolve_winner(label, team1, team2),
            WinnerConvention::LabelOneIsTeam2 => resolve_winner(label, team2, team1),
        }
    }
}

/// Read and deserialize a JSON artifact, mapping every failure to `StartupError`.
pub(crate) fn read_artifact<T: serde::de::DeserializeOwned>(
    what: &str,
    path: &Path,
) -> Result<T, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::StartupError(format!("failed to read {} at {}: {}", what, path.display(), e))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        PipelineError::StartupError(format!("failed to parse {} at {}: {}", what, path.display(), e))
    })
}

#[cfg(test)]
pub(crate) fn write_temp_artifact(name: &str, body: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("ipl-artifact-{}-{}", std::process::id(), name));
    std::fs::write(&path, body).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed([f64; 2]);

    impl Classifier for Fixed {
        fn predict_proba(&self, _: &FeatureVector) -> Result<[f64; 2], PipelineError> {
            Ok(self.0)
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn predict_picks_most_probable_class() {
        let x = FeatureVector([0.0; 11]);
        assert_eq!(Fixed([0.2, 0.8]).predict(&x).unwrap(), ClassLabel::One);
        assert_eq!(Fixed([0.7, 0.3]).predict(&x).unwrap(), ClassLabel::Zero);
        assert_eq!(Fixed([0.5, 0.5]).predict(&x).unwrap(), ClassLabel::Zero);
    }

    #[test]
    fn from_proba_breaks_ties_towards_zero() {
        assert_eq!(ClassLabel::from_proba([0.4, 0.6]), ClassLabel::One);
        assert_eq!(ClassLabel::from_proba([0.5, 0.5]), ClassLabel::Zero);
    }

    #[test]
    fn class_label_only_accepts_binary_values() {
        assert_eq!(ClassLabel::from_raw(0), Some(ClassLabel::Zero));
        assert_eq!(ClassLabel::from_raw(1), Some(ClassLabel::One));
        assert_eq!(ClassLabel::from_raw(2), None);
        assert_eq!(ClassLabel::from_raw(-1), None);
    }

    #[test]
    fn conventions_are_mirror_images() {
        let (a, b) = (Team::KolkataKnightRiders, Team::RajasthanRoyals);
        let default = WinnerConvention::default();
        assert_eq!(default.resolve(ClassLabel::One, a, b), a);
        assert_eq!(default.resolve(ClassLabel::Zero, a, b), b);
        let flipped = WinnerConvention::LabelOneIsTeam2;
        assert_eq!(flipped.resolve(ClassLabel::One, a, b), b);
        assert_eq!(flipped.resolve(ClassLabel::Zero, a, b), a);
    }

    #[test]
    fn convention_serializes_as_team_slot() {
        let c: WinnerConvention = serde_json::from_str("\"team2\"").unwrap();
        assert_eq!(c, WinnerConvention::LabelOneIsTeam2);
        assert_eq!(
            serde_json::to_string(&WinnerConvention::LabelOneIsTeam1).unwrap(),
            "\"team1\""
        );
    }

    #[test]
    fn missing_artifact_is_a_startup_error() {
        let err = read_artifact::<serde_json::Value>("model", Path::new("/no/such/model.json"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::StartupError(_)));
    }
}
