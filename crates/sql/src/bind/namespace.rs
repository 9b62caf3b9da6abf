// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use conflux_catalog::CatalogTx;
use conflux_core::interface::{ColumnDef, PrimaryKeyDef, TableDef, TableFunctionDef, TableId, TableKind};

use crate::ast::{TableRef, MergeStatement};
use crate::expression::ColumnOrigin;

/// What a table reference resolved to in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    Table(TableDef),
    Function(TableFunctionDef),
}

impl Relation {
    pub fn columns(&self) -> &[ColumnDef] {
        match self {
            Relation::Table(table) => &table.columns,
            Relation::Function(function) => &function.columns,
        }
    }

    /// The table id, if this relation is a table. Function rows carry no
    /// table identity and their columns carry no SELECT privileges.
    pub fn table_id(&self) -> Option<TableId> {
        match self {
            Relation::Table(table) => Some(table.id),
            Relation::Function(_) => None,
        }
    }

    pub fn table_kind(&self) -> Option<TableKind> {
        match self {
            Relation::Table(table) => Some(table.kind),
            Relation::Function(_) => None,
        }
    }

    pub fn primary_key(&self) -> Option<&PrimaryKeyDef> {
        match self {
            Relation::Table(table) => table.primary_key.as_ref(),
            Relation::Function(_) => None,
        }
    }
}

/// One side of the two-table merge namespace: a resolved relation under its
/// exposed name, tagged with the side it plays.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundTable {
    pub exposed_name: String,
    pub origin: ColumnOrigin,
    pub relation: Relation,
}

impl BoundTable {
    /// Capability query: does this namespace expose the column?
    pub fn exposes(&self, column: &str) -> bool {
        self.column(column).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.relation.columns().iter().find(|column| column.name == name)
    }
}

/// The bound (source, target) namespace of a MERGE statement. Every bind
/// produces an independently owned pair; binding one pair never aliases or
/// mutates another, which is what makes the per-clause disposable namespaces
/// safe.
#[derive(Debug, Clone, PartialEq)]
pub struct FromPair {
    pub source: BoundTable,
    pub target: BoundTable,
}

/// Outcome of resolving a column name against a [`FromPair`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    Source(&'a ColumnDef),
    Target(&'a ColumnDef),
    /// Unqualified and exposed by both sides.
    Ambiguous,
    /// Qualified by a name that is neither exposed name. Deliberately not an
    /// error here; later passes may know what to do with it.
    ForeignQualifier,
    NotFound,
}

impl FromPair {
    /// Resolve both sides of the statement against the catalog. The caller
    /// decides which origin tags the pair carries, so the shared driving
    /// pair and the per-clause disposable pairs go through the same path.
    pub fn bind(
        catalog: &mut impl CatalogTx,
        statement: &MergeStatement,
    ) -> crate::Result<FromPair> {
        let source = Self::bind_table(catalog, &statement.source, ColumnOrigin::Source)?;
        let target = Self::bind_table(catalog, &statement.target, ColumnOrigin::Target)?;
        Ok(FromPair { source, target })
    }

    fn bind_table(
        catalog: &mut impl CatalogTx,
        table: &TableRef,
        origin: ColumnOrigin,
    ) -> crate::Result<BoundTable> {
        let relation = match table {
            TableRef::Named(named) => {
                let def = catalog
                    .find_table_by_name(named.name.text())?
                    .ok_or_else(|| crate::Error::TableNotFound { name: named.name.clone() })?;
                Relation::Table(def)
            }
            TableRef::Function(function) => {
                let def = catalog
                    .find_table_function_by_name(function.name.text())?
                    .ok_or_else(|| crate::Error::TableNotFound { name: function.name.clone() })?;
                Relation::Function(def)
            }
        };
        Ok(BoundTable { exposed_name: table.exposed_name().to_string(), origin, relation })
    }

    /// Two-step column resolution: a qualified name goes to the side whose
    /// exposed name matches; an unqualified name probes the source first,
    /// then the target.
    pub fn lookup(&self, qualifier: Option<&str>, column: &str) -> Lookup<'_> {
        match qualifier {
            Some(qualifier) if qualifier == self.source.exposed_name => {
                match self.source.column(column) {
                    Some(def) => Lookup::Source(def),
                    None => Lookup::NotFound,
                }
            }
            Some(qualifier) if qualifier == self.target.exposed_name => {
                match self.target.column(column) {
                    Some(def) => Lookup::Target(def),
                    None => Lookup::NotFound,
                }
            }
            Some(_) => Lookup::ForeignQualifier,
            None => match (self.source.column(column), self.target.column(column)) {
                (Some(_), Some(_)) => Lookup::Ambiguous,
                (Some(def), None) => Lookup::Source(def),
                (None, Some(def)) => Lookup::Target(def),
                (None, None) => Lookup::NotFound,
            },
        }
    }

}

/// Structural validation of the statement, before anything touches the
/// catalog. Order matters: shape first, then name clashes, then the pieces
/// that need catalog access (synonyms, relation kinds) follow in
/// [`validate_relations`].
pub fn validate_shape(statement: &MergeStatement) -> crate::Result<()> {
    if matches!(statement.target, TableRef::Function(_)) {
        return Err(crate::Error::TargetNotBaseTable { name: statement.target.name().clone() });
    }

    if statement.source.exposed_name() == statement.target.exposed_name() {
        return Err(crate::Error::SameExposedName {
            name: statement.source.exposed_name().to_string(),
        });
    }

    if statement.source.column_list().is_some() {
        return Err(crate::Error::DerivedColumnList { name: statement.source.name().clone() });
    }
    if statement.target.column_list().is_some() {
        return Err(crate::Error::DerivedColumnList { name: statement.target.name().clone() });
    }

    Ok(())
}

/// Reject synonyms on either side. Table functions cannot be synonyms.
pub fn forbid_synonyms(
    catalog: &mut impl CatalogTx,
    statement: &MergeStatement,
) -> crate::Result<()> {
    forbid_synonym(catalog, &statement.target)?;
    if let TableRef::Named(_) = &statement.source {
        forbid_synonym(catalog, &statement.source)?;
    }
    Ok(())
}

fn forbid_synonym(catalog: &mut impl CatalogTx, table: &TableRef) -> crate::Result<()> {
    if let Some(stands_for) = catalog.resolve_synonym(table.name().text())? {
        return Err(crate::Error::SynonymForbidden { name: table.name().clone(), stands_for });
    }
    Ok(())
}

/// Kind checks that need the bound relations.
pub fn validate_relations(pair: &FromPair, statement: &MergeStatement) -> crate::Result<()> {
    if !target_is_base(&pair.target) {
        return Err(crate::Error::TargetNotBaseTable { name: statement.target.name().clone() });
    }
    validate_source_relation(pair, statement)
}

/// The source rule alone. The driving-join builder re-checks it against the
/// real (non-clone) source after the join is bound.
pub fn validate_source_relation(pair: &FromPair, statement: &MergeStatement) -> crate::Result<()> {
    if !source_is_base_view_or_function(&pair.source) {
        return Err(crate::Error::SourceNotBaseViewOrFunction {
            name: statement.source.name().clone(),
        });
    }
    Ok(())
}

fn target_is_base(target: &BoundTable) -> bool {
    matches!(
        target.relation.table_kind(),
        Some(TableKind::Base) | Some(TableKind::GlobalTemporary)
    )
}

fn source_is_base_view_or_function(source: &BoundTable) -> bool {
    match source.relation.table_kind() {
        // a table function
        None => true,
        Some(TableKind::Base)
        | Some(TableKind::GlobalTemporary)
        | Some(TableKind::System)
        | Some(TableKind::View) => true,
        Some(TableKind::External) => false,
    }
}

#[cfg(test)]
mod tests {
    use conflux_catalog::test_utils::TestCatalog;
    use conflux_core::Type;
    use conflux_core::interface::TableKind;

    use crate::ast::{MergeStatement, TableRef};
    use crate::expression::{ColumnExpression, Expression};

    use super::*;

    fn statement(source: TableRef, target: TableRef) -> MergeStatement {
        MergeStatement {
            target,
            source,
            on: Expression::Column(ColumnExpression::new(None, conflux_core::Fragment::internal("x"))),
            clauses: vec![],
        }
    }

    fn catalog() -> TestCatalog {
        TestCatalog::new()
            .with_table("src", &[("a", Type::Int4), ("both", Type::Int4)])
            .with_table("tgt", &[("b", Type::Int4), ("both", Type::Int4)])
    }

    mod validate_shape {
        use super::*;

        #[test]
        fn test_same_exposed_name() {
            let stmt = statement(
                TableRef::named("src").with_alias("x"),
                TableRef::named("tgt").with_alias("x"),
            );
            let err = validate_shape(&stmt).unwrap_err();
            assert!(matches!(err, crate::Error::SameExposedName { name } if name == "x"));
        }

        #[test]
        fn test_derived_column_list() {
            let stmt = statement(
                TableRef::named("src")
                    .with_column_list(vec![conflux_core::Fragment::internal("x")]),
                TableRef::named("tgt"),
            );
            assert!(matches!(
                validate_shape(&stmt).unwrap_err(),
                crate::Error::DerivedColumnList { .. }
            ));
        }

        #[test]
        fn test_function_target_rejected() {
            let stmt = statement(
                TableRef::named("src"),
                TableRef::Function(crate::ast::TableFunctionRef {
                    name: conflux_core::Fragment::internal("f"),
                    args: vec![],
                    alias: None,
                    column_list: None,
                }),
            );
            assert!(matches!(
                validate_shape(&stmt).unwrap_err(),
                crate::Error::TargetNotBaseTable { .. }
            ));
        }

        #[test]
        fn test_ok() {
            let stmt = statement(TableRef::named("src"), TableRef::named("tgt"));
            validate_shape(&stmt).unwrap();
        }
    }

    mod forbid_synonyms {
        use super::*;

        #[test]
        fn test_source_synonym() {
            let mut catalog = catalog().with_synonym("s", "src");
            let stmt = statement(TableRef::named("s"), TableRef::named("tgt"));
            assert!(matches!(
                forbid_synonyms(&mut catalog, &stmt).unwrap_err(),
                crate::Error::SynonymForbidden { .. }
            ));
        }

        #[test]
        fn test_plain_names_pass() {
            let mut catalog = catalog();
            let stmt = statement(TableRef::named("src"), TableRef::named("tgt"));
            forbid_synonyms(&mut catalog, &stmt).unwrap();
        }
    }

    mod bind {
        use super::*;

        #[test]
        fn test_origin_tags() {
            let mut catalog = catalog();
            let stmt = statement(TableRef::named("src").with_alias("s"), TableRef::named("tgt"));
            let pair = FromPair::bind(&mut catalog, &stmt).unwrap();

            assert_eq!(pair.source.origin, ColumnOrigin::Source);
            assert_eq!(pair.source.exposed_name, "s");
            assert_eq!(pair.target.origin, ColumnOrigin::Target);
            assert_eq!(pair.target.exposed_name, "tgt");
        }

        #[test]
        fn test_missing_table() {
            let mut catalog = catalog();
            let stmt = statement(TableRef::named("nope"), TableRef::named("tgt"));
            assert!(matches!(
                FromPair::bind(&mut catalog, &stmt).unwrap_err(),
                crate::Error::TableNotFound { .. }
            ));
        }

        #[test]
        fn test_rebinding_is_isolated() {
            let mut catalog = catalog();
            let stmt = statement(TableRef::named("src"), TableRef::named("tgt"));
            let shared = FromPair::bind(&mut catalog, &stmt).unwrap();
            let snapshot = shared.clone();

            let mut disposable = FromPair::bind(&mut catalog, &stmt).unwrap();
            disposable.source.exposed_name = "mutated".to_string();

            assert_eq!(shared, snapshot);
        }
    }

    mod lookup {
        use super::*;

        fn pair() -> FromPair {
            let mut catalog = catalog();
            let stmt = statement(TableRef::named("src").with_alias("s"), TableRef::named("tgt"));
            FromPair::bind(&mut catalog, &stmt).unwrap()
        }

        #[test]
        fn test_qualified() {
            let pair = pair();
            assert!(matches!(pair.lookup(Some("s"), "a"), Lookup::Source(_)));
            assert!(matches!(pair.lookup(Some("tgt"), "b"), Lookup::Target(_)));
            assert!(matches!(pair.lookup(Some("s"), "b"), Lookup::NotFound));
        }

        #[test]
        fn test_unqualified_probes_source_first() {
            let pair = pair();
            assert!(matches!(pair.lookup(None, "a"), Lookup::Source(_)));
            assert!(matches!(pair.lookup(None, "b"), Lookup::Target(_)));
        }

        #[test]
        fn test_ambiguous() {
            let pair = pair();
            assert!(matches!(pair.lookup(None, "both"), Lookup::Ambiguous));
        }

        #[test]
        fn test_foreign_qualifier() {
            let pair = pair();
            assert!(matches!(pair.lookup(Some("other"), "a"), Lookup::ForeignQualifier));
        }
    }

    mod validate_relations {
        use super::*;

        #[test]
        fn test_view_target_rejected() {
            let mut catalog = TestCatalog::new()
                .with_table("src", &[("a", Type::Int4)])
                .with_table_of_kind("v", TableKind::View, &[("b", Type::Int4)]);
            let stmt = statement(TableRef::named("src"), TableRef::named("v"));
            let pair = FromPair::bind(&mut catalog, &stmt).unwrap();

            assert!(matches!(
                validate_relations(&pair, &stmt).unwrap_err(),
                crate::Error::TargetNotBaseTable { .. }
            ));
        }

        #[test]
        fn test_view_source_allowed() {
            let mut catalog = TestCatalog::new()
                .with_table_of_kind("v", TableKind::View, &[("a", Type::Int4)])
                .with_table("tgt", &[("b", Type::Int4)]);
            let stmt = statement(TableRef::named("v"), TableRef::named("tgt"));
            let pair = FromPair::bind(&mut catalog, &stmt).unwrap();

            validate_relations(&pair, &stmt).unwrap();
        }

        #[test]
        fn test_external_source_rejected() {
            let mut catalog = TestCatalog::new()
                .with_table_of_kind("ext", TableKind::External, &[("a", Type::Int4)])
                .with_table("tgt", &[("b", Type::Int4)]);
            let stmt = statement(TableRef::named("ext"), TableRef::named("tgt"));
            let pair = FromPair::bind(&mut catalog, &stmt).unwrap();

            assert!(matches!(
                validate_relations(&pair, &stmt).unwrap_err(),
                crate::Error::SourceNotBaseViewOrFunction { .. }
            ));
        }

        #[test]
        fn test_function_source_allowed() {
            let mut catalog = TestCatalog::new()
                .with_table_function("f", &[("a", Type::Int4)])
                .with_table("tgt", &[("b", Type::Int4)]);
            let stmt = statement(
                TableRef::Function(crate::ast::TableFunctionRef {
                    name: conflux_core::Fragment::internal("f"),
                    args: vec![],
                    alias: None,
                    column_list: None,
                }),
                TableRef::named("tgt"),
            );
            let pair = FromPair::bind(&mut catalog, &stmt).unwrap();

            validate_relations(&pair, &stmt).unwrap();
        }
    }
}
