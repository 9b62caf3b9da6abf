// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Binding turns a parsed MERGE statement into a [`BoundMerge`]: the driving
//! left-outer join, the projection list of the driving scan, the compiled
//! matching clauses with their row offsets and the privileges the statement
//! requires.
//!
//! Validation and clause binding run against disposable namespaces, freshly
//! resolved from the catalog each time, so no binding state leaks between
//! clauses or into the shared driving join. Privilege collection is
//! suppressed for everything except the clause expressions and the final
//! on-clause pass.

pub mod clause;
pub mod driving;
pub mod expression;
pub mod namespace;
pub mod privilege;
pub mod projection;

use conflux_catalog::CatalogTx;
use tracing::instrument;

use crate::ast::MergeStatement;
use crate::bind::clause::{CompiledClause, compile_clause};
use crate::bind::driving::DrivingJoin;
use crate::bind::namespace::{FromPair, forbid_synonyms, validate_relations, validate_shape};
use crate::bind::privilege::{PrivilegeCollector, PrivilegeSet};
use crate::bind::projection::{DrivingColumnMap, ProjectionList};
use crate::expression::ColumnOrigin;

/// A fully bound MERGE statement, ready for optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundMerge {
    pub driving: DrivingJoin,
    pub projection: ProjectionList,
    pub clauses: Vec<CompiledClause>,
    pub privileges: PrivilegeSet,
}

#[instrument(skip_all, fields(target = %statement.target.name(), source = %statement.source.name()))]
pub fn bind_merge(
    catalog: &mut impl CatalogTx,
    statement: &MergeStatement,
) -> crate::Result<BoundMerge> {
    validate_shape(statement)?;
    forbid_synonyms(catalog, statement)?;

    let privileges = PrivilegeCollector::new();

    // probe bind, only to check the relation rules early
    {
        let _suppress = privileges.suppress();
        let probe = FromPair::bind(catalog, statement)?;
        validate_relations(&probe, statement)?;
    }

    // clauses bind first so their driving-column requests are registered
    // before the projection list is frozen
    let mut map = DrivingColumnMap::new();
    let mut clauses = Vec::with_capacity(statement.clauses.len());
    for clause in &statement.clauses {
        clauses.push(compile_clause(catalog, &privileges, statement, clause, &mut map)?);
    }

    let driving = DrivingJoin::build(catalog, &privileges, statement)?;

    // on-clause columns join the projection as unresolved requests and are
    // associated against the real namespace
    map.add_expression(&driving.namespace, &driving.on, ColumnOrigin::Unknown)?;

    let projection = map.build(&driving.namespace);
    for clause in &mut clauses {
        clause.bind_then_columns(&projection);
    }

    driving.charge_on_clause_privileges(&privileges);

    Ok(BoundMerge { driving, projection, clauses, privileges: privileges.finish() })
}
