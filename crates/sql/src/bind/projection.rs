// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use indexmap::IndexMap;

use crate::bind::driving::ROW_LOCATION_COLUMN;
use crate::bind::namespace::{FromPair, Lookup};
use crate::expression::{ColumnOrigin, Expression};

/// Key of the driving-column map: (exposed table name, column name).
pub type ProjectionKey = (String, String);

/// The evolving set of columns the driving scan must project: everything the
/// join predicate, the refinements and the clause actions need. Keys are
/// unique; requesting a column that is already present overwrites the stored
/// origin (last request wins) instead of appending a duplicate.
#[derive(Debug, Default)]
pub struct DrivingColumnMap {
    entries: IndexMap<ProjectionKey, ColumnOrigin>,
}

impl DrivingColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every column an expression references. `origin` overrides
    /// the probe for requests whose side is already known (a DELETE clause
    /// buffers target columns only); pass `Unknown` to let the namespaces
    /// decide.
    pub fn add_expression(
        &mut self,
        namespace: &FromPair,
        expression: &Expression,
        origin: ColumnOrigin,
    ) -> crate::Result<()> {
        for column in expression.columns() {
            let qualifier = column.table.as_ref().map(|table| table.text().to_string());
            self.add_column(namespace, qualifier.as_deref(), column.name.text(), origin)?;
        }
        Ok(())
    }

    /// Register a single column request.
    pub fn add_column(
        &mut self,
        namespace: &FromPair,
        qualifier: Option<&str>,
        name: &str,
        origin: ColumnOrigin,
    ) -> crate::Result<()> {
        // unqualified requests must resolve here or the statement is bad
        let qualifier = match qualifier {
            Some(qualifier) => qualifier.to_string(),
            None => match namespace.lookup(None, name) {
                Lookup::Source(_) => namespace.source.exposed_name.clone(),
                Lookup::Target(_) => namespace.target.exposed_name.clone(),
                Lookup::Ambiguous => {
                    return Err(crate::Error::AmbiguousColumn {
                        column: conflux_core::Fragment::internal(name),
                    });
                }
                Lookup::NotFound | Lookup::ForeignQualifier => {
                    return Err(crate::Error::ColumnNotFound {
                        column: conflux_core::Fragment::internal(name),
                    });
                }
            },
        };

        let origin = self.associate(namespace, &qualifier, name, origin);

        // last write wins; IndexMap keeps the first insertion position, so a
        // re-request never produces a second entry
        self.entries.insert((qualifier, name.to_string()), origin);
        Ok(())
    }

    /// Resolve an `Unknown` request by probing the source namespace, then
    /// the target namespace. A request matching neither stays `Unknown`;
    /// whether that is an error is decided by later binding passes, which
    /// may have context this pass lacks.
    fn associate(
        &self,
        namespace: &FromPair,
        qualifier: &str,
        name: &str,
        origin: ColumnOrigin,
    ) -> ColumnOrigin {
        if origin != ColumnOrigin::Unknown {
            return origin;
        }
        if namespace.source.exposed_name == qualifier && namespace.source.exposes(name) {
            return ColumnOrigin::Source;
        }
        if namespace.target.exposed_name == qualifier && namespace.target.exposes(name) {
            return ColumnOrigin::Target;
        }
        ColumnOrigin::Unknown
    }

    /// Freeze the map into the projection list of the driving scan: source
    /// columns first, then target columns, each group sorted by column name,
    /// then the row-location sentinel. Entries still `Unknown` are not
    /// projected.
    pub fn build(&self, namespace: &FromPair) -> ProjectionList {
        let mut columns = Vec::with_capacity(self.entries.len() + 1);
        self.append_group(&mut columns, ColumnOrigin::Source, &namespace.source.exposed_name);
        self.append_group(&mut columns, ColumnOrigin::Target, &namespace.target.exposed_name);
        columns.push(ProjectionColumn {
            origin: ColumnOrigin::Target,
            table: namespace.target.exposed_name.clone(),
            name: ROW_LOCATION_COLUMN.to_string(),
        });
        ProjectionList { columns }
    }

    fn append_group(&self, into: &mut Vec<ProjectionColumn>, origin: ColumnOrigin, table: &str) {
        let mut names: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, entry)| **entry == origin)
            .map(|((_, name), _)| name.as_str())
            .collect();
        names.sort_unstable();
        into.extend(names.into_iter().map(|name| ProjectionColumn {
            origin,
            table: table.to_string(),
            name: name.to_string(),
        }));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn origin_of(&self, qualifier: &str, name: &str) -> Option<ColumnOrigin> {
        self.entries.get(&(qualifier.to_string(), name.to_string())).copied()
    }
}

/// One projected column of the driving scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionColumn {
    pub origin: ColumnOrigin,
    pub table: String,
    pub name: String,
}

/// The frozen, ordered projection of the driving scan. The last entry is
/// always the row-location sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionList {
    columns: Vec<ProjectionColumn>,
}

impl ProjectionList {
    pub fn columns(&self) -> &[ProjectionColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row_location_index(&self) -> usize {
        self.columns.len() - 1
    }

    pub fn offset_of(&self, table: &str, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.table == table && column.name == name)
    }
}
