use serde::Deserialize;

/// Tuning knobs of the symmetry expansion engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpansionConfig {
    /// Special-position collapsing tolerance, relative to each cell-axis
    /// length: two atom copies collapse when their Cartesian offset stays
    /// below `position_tolerance * axis_length` on every axis.
    pub position_tolerance: f64,

    /// Safety cap on the number of connections the breadth-first traversal
    /// processes. Exceeding it yields a partial (but consistent) expansion
    /// with a diagnostic, not an error.
    pub max_iterations: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            position_tolerance: 1e-4,
            max_iterations: 10_000,
        }
    }
}
