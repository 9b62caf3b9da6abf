// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The value type of a column or expression. `UserDefined` types are owned by
/// the catalog and require a USAGE privilege wherever they are referenced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Int1,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Utf8,
    Blob,
    Date,
    DateTime,
    Time,
    Interval,
    Uuid,
    RowLocation,
    UserDefined(String),
}

impl Type {
    pub fn is_user_defined(&self) -> bool {
        matches!(self, Type::UserDefined(_))
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("BOOL"),
            Type::Int1 => f.write_str("INT1"),
            Type::Int2 => f.write_str("INT2"),
            Type::Int4 => f.write_str("INT4"),
            Type::Int8 => f.write_str("INT8"),
            Type::Float4 => f.write_str("FLOAT4"),
            Type::Float8 => f.write_str("FLOAT8"),
            Type::Utf8 => f.write_str("UTF8"),
            Type::Blob => f.write_str("BLOB"),
            Type::Date => f.write_str("DATE"),
            Type::DateTime => f.write_str("DATETIME"),
            Type::Time => f.write_str("TIME"),
            Type::Interval => f.write_str("INTERVAL"),
            Type::Uuid => f.write_str("UUID"),
            Type::RowLocation => f.write_str("ROW LOCATION"),
            Type::UserDefined(name) => f.write_str(name),
        }
    }
}
