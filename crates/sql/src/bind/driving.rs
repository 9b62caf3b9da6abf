// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use conflux_catalog::CatalogTx;
use conflux_core::Type;

use crate::ast::MergeStatement;
use crate::bind::expression::bind_expression;
use crate::bind::namespace::{FromPair, validate_source_relation};
use crate::bind::privilege::PrivilegeCollector;
use crate::expression::Expression;

/// Reserved name of the synthesized row-location column. The leading `###`
/// keeps it out of the identifier space reachable from statement text.
pub const ROW_LOCATION_COLUMN: &str = "###merge_row_location";

/// Descriptor of the synthesized row-location column on the target side of
/// the driving join. At runtime the column is non-null exactly when the
/// driving row matched an existing target row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLocationColumn {
    pub table: String,
    pub name: String,
    pub ty: Type,
}

impl RowLocationColumn {
    fn for_target(target: &str) -> Self {
        Self {
            table: target.to_string(),
            name: ROW_LOCATION_COLUMN.to_string(),
            ty: Type::RowLocation,
        }
    }
}

/// The synthesized left-outer join driving the MERGE:
/// `source LEFT JOIN target ON predicate`, plus the row-location column used
/// at runtime to tell matched rows from unmatched ones. Lives from binding
/// until the runtime plan is emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivingJoin {
    pub namespace: FromPair,
    pub on: Expression,
    pub row_location: RowLocationColumn,
}

impl DrivingJoin {
    /// Bind the real driving join. Table and predicate binding run with
    /// privilege collection suppressed; the predicate's requirements are
    /// charged by the explicit on-clause pass
    /// ([`DrivingJoin::charge_on_clause_privileges`]), nothing else about
    /// the join contributes any.
    pub fn build(
        catalog: &mut impl CatalogTx,
        privileges: &PrivilegeCollector,
        statement: &MergeStatement,
    ) -> crate::Result<DrivingJoin> {
        let namespace = {
            let _suppress = privileges.suppress();
            FromPair::bind(catalog, statement)?
        };

        // the clone was validated during statement binding; the real source
        // must satisfy the same rule
        validate_source_relation(&namespace, statement)?;

        let on = {
            let _suppress = privileges.suppress();
            bind_expression(catalog, &namespace, &statement.on)?
        };

        let row_location = RowLocationColumn::for_target(&namespace.target.exposed_name);
        Ok(DrivingJoin { namespace, on, row_location })
    }

    /// The on-clause privilege pass: USAGE on referenced user-defined types,
    /// SELECT on resolved columns with a concrete descriptor, EXECUTE on
    /// referenced routines.
    pub fn charge_on_clause_privileges(&self, privileges: &PrivilegeCollector) {
        privileges.charge_expression(&self.on);
    }
}
