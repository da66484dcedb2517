use crate::core::symmetry::ops::SymmetryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpansionError {
    /// A bond or hydrogen bond references a label that no connectivity
    /// group covers. The cached partition is stale or the input is
    /// mistyped; no partial structure is returned in this case.
    #[error(
        "bond endpoint '{label}' does not belong to any connectivity group; \
         rebuild connectivity before expanding"
    )]
    UnresolvedLabel { label: String },

    #[error("symmetry algebra failure: {source}")]
    Symmetry {
        #[from]
        source: SymmetryError,
    },

    #[error("internal consistency failure: {0}")]
    Internal(String),
}
