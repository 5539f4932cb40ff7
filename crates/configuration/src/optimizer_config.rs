use serde::Deserialize;

/// Settings for a grid-search job. Deserialized from the `[optimizer]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Size of the worker pool. `None` uses every available core.
    pub workers: Option<usize>,
    /// Draw a progress bar while combinations are evaluated.
    pub show_progress: bool,
    /// Ordered parameter space. The declared order fixes the enumeration order,
    /// and therefore which of several equally-scored combinations wins.
    pub parameter_space: Vec<ParameterDef>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            workers: None,
            show_progress: true,
            parameter_space: Vec::new(),
        }
    }
}

/// A single named axis of the parameter grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParameterDef {
    pub name: String,
    pub range: ParameterRange,
}

impl ParameterDef {
    pub fn new(name: impl Into<String>, range: ParameterRange) -> Self {
        Self { name: name.into(), range }
    }
}

/// Represents a range of values for a single parameter to be tested.
///
/// Linear ranges are inclusive of `end` when the step lands on it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterRange {
    DiscreteInt(Vec<i64>),
    DiscreteFloat(Vec<f64>),
    LinearInt { start: i64, end: i64, step: i64 },
    LinearFloat { start: f64, end: f64, step: f64 },
}
