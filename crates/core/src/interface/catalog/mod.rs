// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

mod column;
mod routine;
mod table;

pub use column::{ColumnDef, ColumnId, ColumnIndex};
pub use routine::{RoutineDef, RoutineId};
pub use table::{PrimaryKeyDef, TableDef, TableFunctionDef, TableId, TableKind};
