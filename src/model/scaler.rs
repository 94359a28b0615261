use serde::Deserialize;
use std::path::Path;

use super::{read_artifact, Scaler};
use crate::error::PipelineError;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Scaler parameters exported from the training notebook.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    StandardScaler { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMaxScaler { min: Vec<f64>, scale: Vec<f64> },
}

impl ScalerArtifact {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let artifact: ScalerArtifact = read_artifact("scaler", path.as_ref())?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let (offset, scale) = self.params();
        if scale.is_empty() {
            return Err(PipelineError::StartupError("scaler has no parameters".into()));
        }
        if offset.len() != scale.len() {
            return Err(PipelineError::StartupError(format!(
                "scaler parameter lengths differ: {} vs {}",
                offset.len(),
                scale.len()
            )));
        }
        if offset.iter().chain(scale).any(|v| !v.is_finite()) {
            return Err(PipelineError::StartupError(
                "scaler parameters must be finite".into(),
            ));
        }
        if let ScalerArtifact::StandardScaler { scale, .. } = self {
            if let Some(i) = scale.iter().position(|s| *s == 0.0) {
                return Err(PipelineError::StartupError(format!(
                    "standard scaler has zero scale for feature {}",
                    i
                )));
            }
        }
        Ok(())
    }

    fn params(&self) -> (&[f64], &[f64]) {
        match self {
            ScalerArtifact::StandardScaler { mean, scale } => (mean, scale),
            ScalerArtifact::MinMaxScaler { min, scale } => (min, scale),
        }
    }

    /// Number of features the scaler was fit on.
    pub fn n_features(&self) -> usize {
        self.params().1.len()
    }
}

impl Scaler for ScalerArtifact {
    fn transform(&self, raw: &FeatureVector) -> Result<FeatureVector, PipelineError> {
        if self.n_features() != FEATURE_COUNT {
            return Err(PipelineError::ScalingError(format!(
                "scaler was fit on {} features, got {}",
                self.n_features(),
                FEATURE_COUNT
            )));
        }
        let mut out = [0.0; FEATURE_COUNT];
        for (i, x) in raw.values().iter().enumerate() {
            out[i] = match self {
                ScalerArtifact::StandardScaler { mean, scale } => (x - mean[i]) / scale[i],
                ScalerArtifact::MinMaxScaler { min, scale } => x * scale[i] + min[i],
            };
        }
        let scaled = FeatureVector(out);
        if !scaled.is_finite() {
            return Err(PipelineError::ScalingError(
                "transform produced a non-finite value".into(),
            ));
        }
        Ok(scaled)
    }

    fn name(&self) -> &str {
        match self {
            ScalerArtifact::StandardScaler { .. } => "standard_scaler",
            ScalerArtifact::MinMaxScaler { .. } => "min_max_scaler",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::write_temp_artifact;
    use approx::assert_relative_eq;

    fn standard(mean: f64, scale: f64) -> ScalerArtifact {
        ScalerArtifact::StandardScaler {
            mean: vec![mean; FEATURE_COUNT],
            scale: vec![scale; FEATURE_COUNT],
        }
    }

    #[test]
    fn standard_scaler_centres_and_divides() {
        let raw = FeatureVector([1.0, 1.0, 1.0, 0.0, 0.0, 20.0, 160.0, 150.0, 50.0, 70.0, 40.0]);
        let scaled = standard(10.0, 2.0).transform(&raw).unwrap();
        assert_relative_eq!(scaled.0[0], -4.5, epsilon = 1e-12);
        assert_relative_eq!(scaled.0[6], 75.0, epsilon = 1e-12);
    }

    #[test]
    fn min_max_scaler_multiplies_then_offsets() {
        let s = ScalerArtifact::MinMaxScaler {
            min: vec![-0.5; FEATURE_COUNT],
            scale: vec![0.01; FEATURE_COUNT],
        };
        let scaled = s.transform(&FeatureVector([100.0; FEATURE_COUNT])).unwrap();
        for v in scaled.values() {
            assert_relative_eq!(*v, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn wrong_width_is_a_scaling_error() {
        let s = ScalerArtifact::StandardScaler {
            mean: vec![0.0; 9],
            scale: vec![1.0; 9],
        };
        let err = s.transform(&FeatureVector([0.0; FEATURE_COUNT])).unwrap_err();
        assert!(matches!(err, PipelineError::ScalingError(_)));
    }

    #[test]
    fn non_finite_output_is_a_scaling_error() {
        let s = standard(0.0, f64::MIN_POSITIVE);
        let err = s.transform(&FeatureVector([f64::MAX; FEATURE_COUNT])).unwrap_err();
        assert!(matches!(err, PipelineError::ScalingError(_)));
    }

    #[test]
    fn loads_standard_scaler_from_json() {
        let body = serde_json::json!({
            "kind": "standard_scaler",
            "mean": vec![1.0; FEATURE_COUNT],
            "scale": vec![2.0; FEATURE_COUNT],
        });
        let path = write_temp_artifact("scaler-ok.json", &body.to_string());
        let s = ScalerArtifact::load(&path).unwrap();
        assert_eq!(s.name(), "standard_scaler");
        assert_eq!(s.n_features(), FEATURE_COUNT);
    }

    #[test]
    fn zero_scale_is_rejected_at_load() {
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[3] = 0.0;
        let body = serde_json::json!({
            "kind": "standard_scaler",
            "mean": vec![0.0; FEATURE_COUNT],
            "scale": scale,
        });
        let path = write_temp_artifact("scaler-zero.json", &body.to_string());
        let err = ScalerArtifact::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::StartupError(_)));
        assert!(err.to_string().contains("feature 3"));
    }

    #[test]
    fn mismatched_lengths_and_unknown_kind_are_rejected() {
        let path = write_temp_artifact(
            "scaler-len.json",
            r#"{"kind":"min_max_scaler","min":[0.0,0.0],"scale":[1.0]}"#,
        );
        assert!(ScalerArtifact::load(&path).is_err());

        let path = write_temp_artifact("scaler-kind.json", r#"{"kind":"robust_scaler"}"#);
        assert!(matches!(
            ScalerArtifact::load(&path),
            Err(PipelineError::StartupError(_))
        ));
    }
}
