use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `STOREPULSE__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Knobs for the customer lifecycle analysis pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Window length used when a request supplies no start date.
    #[serde(default = "default_window_days")]
    pub default_window_days: i64,
    #[serde(default)]
    pub churn: ChurnScoringConfig,
}

/// Weights of the four churn-risk factors.
///
/// Hand-tuned by the retention team; they must sum to 1.0 and any change
/// needs product sign-off. The pipeline warns when the sum drifts.
#[derive(Debug, Clone, Deserialize)]
pub struct ChurnScoringConfig {
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,
    #[serde(default = "default_frequency_weight")]
    pub frequency_weight: f64,
    #[serde(default = "default_segment_weight")]
    pub segment_weight: f64,
    #[serde(default = "default_lifecycle_weight")]
    pub lifecycle_weight: f64,
}

impl ChurnScoringConfig {
    pub fn weight_sum(&self) -> f64 {
        self.recency_weight + self.frequency_weight + self.segment_weight + self.lifecycle_weight
    }

    pub fn is_normalized(&self) -> bool {
        (self.weight_sum() - 1.0).abs() < 1e-6
    }
}

// Default functions
fn default_window_days() -> i64 {
    90
}
fn default_recency_weight() -> f64 {
    0.30
}
fn default_frequency_weight() -> f64 {
    0.25
}
fn default_segment_weight() -> f64 {
    0.25
}
fn default_lifecycle_weight() -> f64 {
    0.20
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
            churn: ChurnScoringConfig::default(),
        }
    }
}

impl Default for ChurnScoringConfig {
    fn default() -> Self {
        Self {
            recency_weight: default_recency_weight(),
            frequency_weight: default_frequency_weight(),
            segment_weight: default_segment_weight(),
            lifecycle_weight: default_lifecycle_weight(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("STOREPULSE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
