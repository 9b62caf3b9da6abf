// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

pub mod catalog;

pub use catalog::{
    ColumnDef, ColumnId, ColumnIndex, PrimaryKeyDef, RoutineDef, RoutineId, TableDef,
    TableFunctionDef, TableId, TableKind,
};
