//! Harness configuration
//!
//! All configuration structs implement `Default` and can be read from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use xqts_diagnostics::HarnessError;

/// Options controlling how assertions are judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorOptions {
    /// When false, any failure satisfies an error assertion regardless of its code
    pub check_error_codes: bool,
    /// Prefix nested assertion queries with a `$result` declaration
    pub declare_result_variable: bool,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            check_error_codes: true,
            declare_result_variable: true,
        }
    }
}

impl EvaluatorOptions {
    pub fn with_error_codes_checked(mut self, check: bool) -> Self {
        self.check_error_codes = check;
        self
    }

    pub fn with_result_declaration(mut self, declare: bool) -> Self {
        self.declare_result_variable = declare;
        self
    }
}

/// Features the engine under test implements
///
/// Unknown features are assumed supported; the optional schema and static typing
/// features are assumed unsupported until declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImplementationCapabilities {
    pub features: HashMap<String, bool>,
}

impl Default for ImplementationCapabilities {
    fn default() -> Self {
        let mut features = HashMap::new();
        for feature in [
            "schemaImport",
            "schemaValidation",
            "staticTyping",
            "typedData",
            "schema-location-hint",
        ] {
            features.insert(feature.to_string(), false);
        }
        Self { features }
    }
}

impl ImplementationCapabilities {
    /// Check if a feature is supported
    pub fn supports(&self, feature: &str) -> bool {
        self.features.get(feature).copied().unwrap_or(true)
    }

    /// Declare support for a feature
    pub fn add_capability(&mut self, feature: impl Into<String>, supported: bool) {
        self.features.insert(feature.into(), supported);
    }

    pub fn with_capability(mut self, feature: impl Into<String>, supported: bool) -> Self {
        self.add_capability(feature, supported);
        self
    }
}

/// Configuration for [`crate::SuiteRunner`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Run only tests whose name starts with this prefix
    pub name_filter: Option<String>,
    /// Run test cases on the rayon thread pool
    pub parallel: bool,
    pub capabilities: ImplementationCapabilities,
    pub evaluator: EvaluatorOptions,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            name_filter: None,
            parallel: cfg!(feature = "parallel"),
            capabilities: ImplementationCapabilities::default(),
            evaluator: EvaluatorOptions::default(),
        }
    }
}

impl RunnerConfig {
    /// Read a configuration from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self, HarnessError> {
        serde_json::from_str(text).map_err(|e| HarnessError::config(e.to_string()))
    }

    pub fn with_name_filter(mut self, prefix: impl Into<String>) -> Self {
        self.name_filter = Some(prefix.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_capabilities(mut self, capabilities: ImplementationCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_evaluator(mut self, evaluator: EvaluatorOptions) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Whether a test with this name is selected by the filter
    pub fn selects(&self, name: &str) -> bool {
        self.name_filter
            .as_deref()
            .is_none_or(|prefix| name.starts_with(prefix))
    }
}
