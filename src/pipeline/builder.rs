use std::path::Path;

use crate::config::GradingConfig;
use crate::error::GradingError;
use crate::pipeline::defaults::{PositionalAligner, SigmoidConfidenceCombiner};
use crate::pipeline::runtime::{Grader, GraderParts};
use crate::pipeline::traits::{ConfidenceCombiner, ReferenceAligner};

pub struct GraderBuilder {
    config: GradingConfig,
    confidence_combiner: Option<Box<dyn ConfidenceCombiner>>,
    reference_aligner: Option<Box<dyn ReferenceAligner>>,
}

impl GraderBuilder {
    pub fn new(config: GradingConfig) -> Self {
        Self {
            config,
            confidence_combiner: None,
            reference_aligner: None,
        }
    }

    pub fn from_config_file(path: &Path) -> Result<Self, GradingError> {
        Ok(Self::new(GradingConfig::load(path)?))
    }

    pub fn with_confidence_combiner(mut self, combiner: Box<dyn ConfidenceCombiner>) -> Self {
        self.confidence_combiner = Some(combiner);
        self
    }

    pub fn with_reference_aligner(mut self, aligner: Box<dyn ReferenceAligner>) -> Self {
        self.reference_aligner = Some(aligner);
        self
    }

    pub fn build(self) -> Result<Grader, GradingError> {
        self.config.validate()?;
        let scale = self.config.confidence_scale;
        Ok(Grader::from_parts(GraderParts {
            config: self.config,
            confidence_combiner: self
                .confidence_combiner
                .unwrap_or_else(|| Box::new(SigmoidConfidenceCombiner::new(scale))),
            reference_aligner: self
                .reference_aligner
                .unwrap_or_else(|| Box::new(PositionalAligner)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::WordQuality;

    struct FixedCombiner(i32);

    impl ConfidenceCombiner for FixedCombiner {
        fn combine(&self, _words: &[WordQuality]) -> Result<i32, GradingError> {
            Ok(self.0)
        }
    }

    #[test]
    fn builder_defaults_validate_config() {
        let grader = GraderBuilder::new(GradingConfig::default())
            .build()
            .expect("default config is valid");
        assert_eq!(grader.config(), &GradingConfig::default());
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = GradingConfig {
            confidence_scale: 0.0,
            ..GradingConfig::default()
        };
        assert!(GraderBuilder::new(config).build().is_err());
    }

    #[test]
    fn builder_accepts_custom_combiner() {
        let grader = GraderBuilder::new(GradingConfig::default())
            .with_confidence_combiner(Box::new(FixedCombiner(12)))
            .build()
            .expect("build should succeed");
        assert_eq!(grader.confidence_combiner().combine(&[]).unwrap(), 12);
    }

    #[test]
    fn from_config_file_fails_on_missing_path() {
        assert!(GraderBuilder::from_config_file(Path::new("/nonexistent/grading.json")).is_err());
    }
}
