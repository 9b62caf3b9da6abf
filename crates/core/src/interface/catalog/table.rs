// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::interface::catalog::column::{ColumnDef, ColumnId};
use crate::interface::catalog::routine::RoutineId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub id: TableId,
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnDef>,
    pub primary_key: Option<PrimaryKeyDef>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    Base,
    GlobalTemporary,
    View,
    System,
    /// Externally managed relation. Readable through scans but not a legal
    /// participant of a MERGE statement.
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKeyDef {
    pub columns: Vec<ColumnId>,
}

/// A table-valued function usable as the source of a MERGE statement. Its
/// columns describe the row shape it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFunctionDef {
    // table functions are routines under the covers and share the routine id space
    pub id: RoutineId,
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(pub u64);

impl Deref for TableId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<u64> for TableId {
    fn eq(&self, other: &u64) -> bool {
        self.0.eq(other)
    }
}

impl From<TableId> for u64 {
    fn from(value: TableId) -> Self {
        value.0
    }
}
