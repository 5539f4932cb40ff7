use crate::error::OptimizerError;
use configuration::{ParameterDef, ParameterRange};
use itertools::Itertools;
use serde_json::{json, Map, Value};
use strategies::StrategyParams;

/// Expands a single range into its concrete values.
fn expand(def: &ParameterDef) -> Result<Vec<Value>, OptimizerError> {
    let name = &def.name;
    let values: Vec<Value> = match &def.range {
        ParameterRange::DiscreteInt(vals) => vals.iter().map(|&v| json!(v)).collect(),
        ParameterRange::DiscreteFloat(vals) => {
            if vals.iter().any(|v| !v.is_finite()) {
                return Err(OptimizerError::ParameterGeneration(format!(
                    "Values for '{}' must be finite.",
                    name
                )));
            }
            vals.iter().map(|&v| json!(v)).collect()
        }
        ParameterRange::LinearInt { start, end, step } => {
            if *step <= 0 {
                return Err(OptimizerError::ParameterGeneration(format!(
                    "Step for '{}' must be positive.",
                    name
                )));
            }
            (*start..=*end).step_by(*step as usize).map(|v| json!(v)).collect()
        }
        ParameterRange::LinearFloat { start, end, step } => {
            if !(start.is_finite() && end.is_finite() && step.is_finite()) || *step <= 0.0 {
                return Err(OptimizerError::ParameterGeneration(format!(
                    "Range for '{}' must be finite with a positive step.",
                    name
                )));
            }
            // Index-based to avoid accumulating rounding error across steps.
            let count = ((end - start) / step + 1e-9).floor();
            if count < 0.0 {
                Vec::new()
            } else {
                (0..=count as usize).map(|i| json!(start + i as f64 * step)).collect()
            }
        }
    };

    if values.is_empty() {
        return Err(OptimizerError::ParameterGeneration(format!(
            "Range for '{}' produces no values.",
            name
        )));
    }
    Ok(values)
}

/// Generates every combination of the parameter space, in enumeration order.
///
/// The declared order of `space` is preserved and the last parameter varies fastest. An
/// empty space yields a single empty combination.
pub fn generate_parameter_sets(
    space: &[ParameterDef],
) -> Result<Vec<Map<String, Value>>, OptimizerError> {
    if let Some(name) = space.iter().map(|d| &d.name).duplicates().next() {
        return Err(OptimizerError::ParameterGeneration(format!(
            "Parameter '{}' is declared more than once.",
            name
        )));
    }
    if space.is_empty() {
        return Ok(vec![Map::new()]);
    }

    let value_lists = space.iter().map(expand).collect::<Result<Vec<_>, _>>()?;

    let combinations = value_lists
        .into_iter()
        .multi_cartesian_product()
        .map(|product| {
            space
                .iter()
                .map(|def| def.name.clone())
                .zip(product)
                .collect::<Map<String, Value>>()
        })
        .collect();

    Ok(combinations)
}

/// Overlays every combination onto `base`, producing typed parameter sets.
///
/// An unknown parameter name or a value of the wrong type fails the whole job before
/// anything is evaluated.
pub fn build_candidates(
    base: &StrategyParams,
    space: &[ParameterDef],
) -> Result<Vec<StrategyParams>, OptimizerError> {
    generate_parameter_sets(space)?
        .iter()
        .map(|overrides| {
            base.with_overrides(overrides)
                .map_err(|e| OptimizerError::ParameterGeneration(e.to_string()))
        })
        .collect()
}

/// The grid historically used for Ichimoku searches.
pub fn default_ichimoku_space() -> Vec<ParameterDef> {
    let linear = |start, end, step| ParameterRange::LinearInt { start, end, step };
    vec![
        ParameterDef::new("tenkan_period", linear(5, 31, 2)),
        ParameterDef::new("kijun_period", linear(20, 60, 2)),
        ParameterDef::new("senkou_span_b_period", linear(40, 120, 2)),
        ParameterDef::new("displacement", linear(20, 45, 5)),
    ]
}
