// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use conflux_core::interface::{RoutineDef, TableDef, TableFunctionDef};

/// Catalog access for one compilation. The statement compiler only ever
/// resolves names through this seam; how the metadata is stored and kept
/// consistent is the catalog's business.
pub trait CatalogTx {
    /// Resolve a table name to its definition. Views and system tables are
    /// tables here; their kind tells them apart.
    fn find_table_by_name(&mut self, name: &str) -> crate::Result<Option<TableDef>>;

    /// Resolve a table-valued function by name.
    fn find_table_function_by_name(&mut self, name: &str) -> crate::Result<Option<TableFunctionDef>>;

    /// Resolve a scalar routine by name.
    fn find_routine_by_name(&mut self, name: &str) -> crate::Result<Option<RoutineDef>>;

    /// If `name` is a synonym, return the name it stands for.
    fn resolve_synonym(&mut self, name: &str) -> crate::Result<Option<String>>;
}
