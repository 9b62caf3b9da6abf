// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use conflux_core::Fragment;

/// Compilation failures. Every variant aborts the compile; there is no
/// recovery and no partial plan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("target of MERGE must be a base table, found '{name}'")]
    TargetNotBaseTable { name: Fragment },

    #[error("source of MERGE must be a base table, view or table function, found '{name}'")]
    SourceNotBaseViewOrFunction { name: Fragment },

    #[error("source and target of MERGE share the exposed name '{name}'")]
    SameExposedName { name: String },

    #[error("derived column lists are not allowed in MERGE, found one on '{name}'")]
    DerivedColumnList { name: Fragment },

    #[error("synonyms are not allowed in MERGE, '{name}' stands for '{stands_for}'")]
    SynonymForbidden { name: Fragment, stands_for: String },

    #[error("table or table function '{name}' does not exist")]
    TableNotFound { name: Fragment },

    #[error("routine '{name}' does not exist")]
    RoutineNotFound { name: Fragment },

    #[error("column '{column}' does not exist in the source or target of the MERGE statement")]
    ColumnNotFound { column: Fragment },

    #[error("column '{column}' is ambiguous, it exists in both the source and the target")]
    AmbiguousColumn { column: Fragment },

    #[error(transparent)]
    Catalog(#[from] conflux_catalog::Error),

    #[error("optimizer failed: {0}")]
    Optimizer(String),
}
