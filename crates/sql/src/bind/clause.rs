// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use conflux_catalog::CatalogTx;
use conflux_core::interface::{ColumnDef, TableId};

use crate::ast::{ClauseKind, MatchingClause, MergeAction, MergeStatement};
use crate::bind::expression::bind_expression;
use crate::bind::namespace::FromPair;
use crate::bind::privilege::PrivilegeCollector;
use crate::bind::projection::{DrivingColumnMap, ProjectionKey, ProjectionList};
use crate::expression::{ColumnOrigin, Expression};

/// One fully bound matching clause: its refinement, its action and the
/// columns it needs the driving scan to buffer for it. Offsets into the
/// final projection row are filled in once the projection list is frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledClause {
    pub kind: ClauseKind,
    pub refinement: Option<Expression>,
    pub action: BoundAction,
    /// `(table, column)` keys this clause needs from the driving row, in
    /// request order, deduplicated.
    pub needed_columns: Vec<ProjectionKey>,
    /// Index of each needed column inside the final projection row.
    pub column_offsets: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundAction {
    Delete { table: TableId },
    Update { table: TableId, set: Vec<BoundAssignment> },
    Insert { table: TableId, columns: Vec<ColumnDef>, values: Vec<Expression> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundAssignment {
    pub column: ColumnDef,
    pub value: Expression,
}

/// Compile one matching clause. The clause binds against its own disposable
/// namespace, freshly resolved from the statement with privilege collection
/// suppressed, so clauses cannot see each other's binding state and the
/// shared driving join stays untouched.
pub fn compile_clause(
    catalog: &mut impl CatalogTx,
    privileges: &PrivilegeCollector,
    statement: &MergeStatement,
    clause: &MatchingClause,
    map: &mut DrivingColumnMap,
) -> crate::Result<CompiledClause> {
    let disposable = {
        let _suppress = privileges.suppress();
        FromPair::bind(catalog, statement)?
    };

    let refinement = clause
        .refinement
        .as_ref()
        .map(|refinement| bind_expression(catalog, &disposable, refinement))
        .transpose()?;
    if let Some(refinement) = &refinement {
        privileges.charge_expression(refinement);
    }

    let mut needed = NeededColumns::default();
    if let Some(refinement) = &refinement {
        needed.add_expression(map, &disposable, refinement, ColumnOrigin::Unknown)?;
    }

    let action = bind_action(catalog, privileges, &disposable, clause, map, &mut needed)?;

    Ok(CompiledClause {
        kind: clause.kind,
        refinement,
        action,
        needed_columns: needed.keys,
        column_offsets: Vec::new(),
    })
}

impl CompiledClause {
    /// Locate this clause's needed columns inside the frozen projection
    /// list. Requests that stayed unresolved are not part of the projection
    /// and produce no offset.
    pub fn bind_then_columns(&mut self, projection: &ProjectionList) {
        self.column_offsets = self
            .needed_columns
            .iter()
            .filter_map(|(table, name)| projection.offset_of(table, name))
            .collect();
    }
}

fn bind_action(
    catalog: &mut impl CatalogTx,
    privileges: &PrivilegeCollector,
    disposable: &FromPair,
    clause: &MatchingClause,
    map: &mut DrivingColumnMap,
    needed: &mut NeededColumns,
) -> crate::Result<BoundAction> {
    let target_table = disposable
        .target
        .relation
        .table_id()
        .expect("target was validated to be a base table");
    let target_name = disposable.target.exposed_name.clone();

    match &clause.action {
        MergeAction::Delete => {
            // a delete touches no source data; it buffers exactly the target
            // key columns its action needs to locate rows
            if let Some(primary_key) = disposable.target.relation.primary_key() {
                let key_columns: Vec<String> = disposable
                    .target
                    .relation
                    .columns()
                    .iter()
                    .filter(|column| primary_key.columns.contains(&column.id))
                    .map(|column| column.name.clone())
                    .collect();
                for column in key_columns {
                    needed.add_column(map, disposable, &target_name, &column, ColumnOrigin::Target)?;
                }
            }
            Ok(BoundAction::Delete { table: target_table })
        }
        MergeAction::Update { set } => {
            let mut assignments = Vec::with_capacity(set.len());
            for assignment in set {
                let column = disposable
                    .target
                    .column(assignment.column.text())
                    .cloned()
                    .ok_or_else(|| crate::Error::ColumnNotFound {
                        column: assignment.column.clone(),
                    })?;
                let value = bind_expression(catalog, disposable, &assignment.value)?;
                privileges.charge_expression(&value);

                needed.add_expression(map, disposable, &value, ColumnOrigin::Unknown)?;
                // the before image of an assigned column is buffered too
                needed.add_column(map, disposable, &target_name, &column.name, ColumnOrigin::Unknown)?;

                assignments.push(BoundAssignment { column, value });
            }
            Ok(BoundAction::Update { table: target_table, set: assignments })
        }
        MergeAction::Insert { columns, values } => {
            let columns = columns
                .iter()
                .map(|column| {
                    disposable
                        .target
                        .column(column.text())
                        .cloned()
                        .ok_or_else(|| crate::Error::ColumnNotFound { column: column.clone() })
                })
                .collect::<crate::Result<Vec<_>>>()?;
            let values = values
                .iter()
                .map(|value| bind_expression(catalog, disposable, value))
                .collect::<crate::Result<Vec<_>>>()?;
            for value in &values {
                privileges.charge_expression(value);
                needed.add_expression(map, disposable, value, ColumnOrigin::Unknown)?;
            }
            Ok(BoundAction::Insert { table: target_table, columns, values })
        }
    }
}

/// The clause's own view of what it registered with the driving-column map,
/// in request order and without duplicates.
#[derive(Debug, Default)]
struct NeededColumns {
    keys: Vec<ProjectionKey>,
}

impl NeededColumns {
    fn add_expression(
        &mut self,
        map: &mut DrivingColumnMap,
        namespace: &FromPair,
        expression: &Expression,
        origin: ColumnOrigin,
    ) -> crate::Result<()> {
        for column in expression.columns() {
            // bound expressions always carry qualifiers
            let qualifier = column
                .table
                .as_ref()
                .map(|table| table.text().to_string())
                .expect("expression was bound before column registration");
            self.add_column(map, namespace, &qualifier, column.name.text(), origin)?;
        }
        Ok(())
    }

    fn add_column(
        &mut self,
        map: &mut DrivingColumnMap,
        namespace: &FromPair,
        qualifier: &str,
        name: &str,
        origin: ColumnOrigin,
    ) -> crate::Result<()> {
        map.add_column(namespace, Some(qualifier), name, origin)?;
        self.remember((qualifier.to_string(), name.to_string()));
        Ok(())
    }

    fn remember(&mut self, key: ProjectionKey) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }
}
