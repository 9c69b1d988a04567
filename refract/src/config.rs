//! Diff configuration.

use crate::error::DiffError;
use facet::Facet;
use stemma::MapperConfig;

/// Tuning for a diff run.
///
/// Every threshold is a calibration value rather than part of the
/// algorithm; [`DiffConfig::default`] holds the values the test-suite is
/// calibrated against.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct DiffConfig {
    /// Wall-clock budget for the whole run. `None` disables the timeout.
    pub timeout_ms: Option<u64>,
    /// Fan class pairs out over the rayon thread pool.
    pub parallel: bool,
    /// Minimum score for pairing two classes that do not share a name.
    pub class_threshold: f64,
    /// Weight of shared member names in the class score.
    pub class_member_weight: f64,
    /// Weight of highly similar operation bodies in the class score.
    pub class_body_weight: f64,
    /// Weight of package-path similarity in the class score.
    pub class_package_weight: f64,
    /// Body similarity at which two same-signature bodies count as
    /// "highly similar" for class scoring.
    pub similar_body_threshold: f64,
    /// Minimum score for pairing operations whose signatures differ.
    pub operation_threshold: f64,
    /// Added to the operation score when the names are equal.
    pub same_name_bonus: f64,
    /// Fewest mapped statements an extracted or inlined operation needs.
    pub min_extracted_statements: usize,
    /// See [`MapperConfig::max_leaf_cost`].
    pub max_leaf_cost: f64,
    /// See [`MapperConfig::composite_threshold`].
    pub composite_threshold: f64,
    /// See [`MapperConfig::trivial_leaf_tokens`].
    pub trivial_leaf_tokens: usize,
    /// See [`MapperConfig::neighborhood_depth`].
    pub neighborhood_depth: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        let mapper = MapperConfig::default();
        Self {
            timeout_ms: Some(600_000),
            parallel: true,
            class_threshold: 0.5,
            class_member_weight: 0.5,
            class_body_weight: 0.3,
            class_package_weight: 0.2,
            similar_body_threshold: 0.75,
            operation_threshold: 0.5,
            same_name_bonus: 0.25,
            min_extracted_statements: 1,
            max_leaf_cost: mapper.max_leaf_cost,
            composite_threshold: mapper.composite_threshold,
            trivial_leaf_tokens: mapper.trivial_leaf_tokens,
            neighborhood_depth: mapper.neighborhood_depth,
        }
    }
}

/// JSON shape of a configuration file: every field optional.
#[derive(Facet, Debug, Default)]
struct ConfigFile {
    /// `0` disables the timeout.
    #[facet(default)]
    timeout_ms: Option<u64>,
    #[facet(default)]
    parallel: Option<bool>,
    #[facet(default)]
    class_threshold: Option<f64>,
    #[facet(default)]
    class_member_weight: Option<f64>,
    #[facet(default)]
    class_body_weight: Option<f64>,
    #[facet(default)]
    class_package_weight: Option<f64>,
    #[facet(default)]
    similar_body_threshold: Option<f64>,
    #[facet(default)]
    operation_threshold: Option<f64>,
    #[facet(default)]
    same_name_bonus: Option<f64>,
    #[facet(default)]
    min_extracted_statements: Option<usize>,
    #[facet(default)]
    max_leaf_cost: Option<f64>,
    #[facet(default)]
    composite_threshold: Option<f64>,
    #[facet(default)]
    trivial_leaf_tokens: Option<usize>,
    #[facet(default)]
    neighborhood_depth: Option<usize>,
}

impl DiffConfig {
    /// Parse a JSON configuration. Missing fields keep their defaults; a
    /// `timeout_ms` of `0` disables the timeout.
    pub fn from_json(json: &str) -> Result<Self, DiffError> {
        let file: ConfigFile =
            facet_json::from_str(json).map_err(|e| DiffError::InvalidConfig {
                message: e.to_string(),
            })?;

        let mut config = Self::default();
        if let Some(ms) = file.timeout_ms {
            config.timeout_ms = (ms > 0).then_some(ms);
        }
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if let Some(v) = file.$field { config.$field = v; })*
            };
        }
        overlay!(
            parallel,
            class_threshold,
            class_member_weight,
            class_body_weight,
            class_package_weight,
            similar_body_threshold,
            operation_threshold,
            same_name_bonus,
            min_extracted_statements,
            max_leaf_cost,
            composite_threshold,
            trivial_leaf_tokens,
            neighborhood_depth
        );
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds outside `[0, 1]` and class weights that sum to zero.
    pub fn validate(&self) -> Result<(), DiffError> {
        let unit = [
            ("class_threshold", self.class_threshold),
            ("class_member_weight", self.class_member_weight),
            ("class_body_weight", self.class_body_weight),
            ("class_package_weight", self.class_package_weight),
            ("similar_body_threshold", self.similar_body_threshold),
            ("max_leaf_cost", self.max_leaf_cost),
            ("composite_threshold", self.composite_threshold),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(DiffError::InvalidConfig {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        if !self.operation_threshold.is_finite() || !self.same_name_bonus.is_finite() {
            return Err(DiffError::InvalidConfig {
                message: "operation scores must be finite".to_string(),
            });
        }
        if self.class_member_weight + self.class_body_weight + self.class_package_weight <= 0.0 {
            return Err(DiffError::InvalidConfig {
                message: "class weights must not all be zero".to_string(),
            });
        }
        Ok(())
    }

    /// Parameters for the statement mapper.
    pub fn mapper(&self) -> MapperConfig {
        MapperConfig {
            max_leaf_cost: self.max_leaf_cost,
            composite_threshold: self.composite_threshold,
            trivial_leaf_tokens: self.trivial_leaf_tokens,
            neighborhood_depth: self.neighborhood_depth,
        }
    }
}

/// Options forwarded to the model builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputOptions {
    /// Fail on unresolved elements instead of dropping them.
    pub strict: bool,
    /// Extra roots the model builder may consult for type resolution.
    pub classpath_roots: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DiffConfig::from_json(r#"{"class_threshold": 0.7, "parallel": false}"#)
            .expect("valid config");
        assert_eq!(config.class_threshold, 0.7);
        assert!(!config.parallel);
        assert_eq!(config.timeout_ms, Some(600_000));
        assert_eq!(config.mapper(), MapperConfig::default());
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = DiffConfig::from_json(r#"{"timeout_ms": 0}"#).expect("valid config");
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let err = DiffConfig::from_json(r#"{"max_leaf_cost": 1.5}"#).unwrap_err();
        assert!(matches!(err, DiffError::InvalidConfig { .. }));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = DiffConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, DiffError::InvalidConfig { .. }));
    }
}
