// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt;
use std::fmt::{Display, Formatter};

use conflux_core::Fragment;

use crate::expression::Expression;

/// A parsed MERGE statement:
///
/// ```text
/// MERGE INTO target
/// USING source
/// ON condition
/// WHEN [NOT] MATCHED [AND refinement] THEN action
/// ...
/// ```
///
/// Pure data. Constructed once from the parse tree, consumed by binding,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeStatement {
    pub target: TableRef,
    pub source: TableRef,
    pub on: Expression,
    pub clauses: Vec<MatchingClause>,
}

/// A table reference in the FROM position of a MERGE statement. A named
/// reference may turn out to be a base table or a view once the catalog has
/// been consulted. The derived column list is carried only so that binding
/// can reject it.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    Named(NamedTableRef),
    Function(TableFunctionRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTableRef {
    pub name: Fragment,
    pub alias: Option<Fragment>,
    pub column_list: Option<Vec<Fragment>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableFunctionRef {
    pub name: Fragment,
    pub args: Vec<Expression>,
    pub alias: Option<Fragment>,
    pub column_list: Option<Vec<Fragment>>,
}

impl TableRef {
    pub fn named(name: impl Into<String>) -> Self {
        TableRef::Named(NamedTableRef {
            name: Fragment::internal(name),
            alias: None,
            column_list: None,
        })
    }

    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        let alias = Some(Fragment::internal(alias));
        match self {
            TableRef::Named(named) => TableRef::Named(NamedTableRef { alias, ..named }),
            TableRef::Function(function) => {
                TableRef::Function(TableFunctionRef { alias, ..function })
            }
        }
    }

    pub fn with_column_list(self, columns: Vec<Fragment>) -> Self {
        let column_list = Some(columns);
        match self {
            TableRef::Named(named) => TableRef::Named(NamedTableRef { column_list, ..named }),
            TableRef::Function(function) => {
                TableRef::Function(TableFunctionRef { column_list, ..function })
            }
        }
    }

    pub fn name(&self) -> &Fragment {
        match self {
            TableRef::Named(named) => &named.name,
            TableRef::Function(function) => &function.name,
        }
    }

    /// The name by which columns of this table are qualified: the alias if
    /// one was given, the table name otherwise.
    pub fn exposed_name(&self) -> &str {
        match self {
            TableRef::Named(named) => {
                named.alias.as_ref().unwrap_or(&named.name).text()
            }
            TableRef::Function(function) => {
                function.alias.as_ref().unwrap_or(&function.name).text()
            }
        }
    }

    pub fn column_list(&self) -> Option<&[Fragment]> {
        match self {
            TableRef::Named(named) => named.column_list.as_deref(),
            TableRef::Function(function) => function.column_list.as_deref(),
        }
    }
}

/// One `WHEN [NOT] MATCHED` unit. The kind always agrees with the action
/// payload; the constructors enforce it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingClause {
    pub kind: ClauseKind,
    pub refinement: Option<Expression>,
    pub action: MergeAction,
}

impl MatchingClause {
    pub fn delete(refinement: Option<Expression>) -> Self {
        Self { kind: ClauseKind::MatchedDelete, refinement, action: MergeAction::Delete }
    }

    pub fn update(refinement: Option<Expression>, set: Vec<SetClause>) -> Self {
        Self { kind: ClauseKind::MatchedUpdate, refinement, action: MergeAction::Update { set } }
    }

    pub fn insert(
        refinement: Option<Expression>,
        columns: Vec<Fragment>,
        values: Vec<Expression>,
    ) -> Self {
        Self {
            kind: ClauseKind::NotMatchedInsert,
            refinement,
            action: MergeAction::Insert { columns, values },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    MatchedDelete,
    MatchedUpdate,
    NotMatchedInsert,
}

impl ClauseKind {
    /// Whether a driving row with the given match state is eligible for a
    /// clause of this kind.
    pub fn accepts(&self, matched: bool) -> bool {
        match self {
            ClauseKind::MatchedDelete | ClauseKind::MatchedUpdate => matched,
            ClauseKind::NotMatchedInsert => !matched,
        }
    }
}

impl Display for ClauseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ClauseKind::MatchedDelete => f.write_str("WHEN MATCHED THEN DELETE"),
            ClauseKind::MatchedUpdate => f.write_str("WHEN MATCHED THEN UPDATE"),
            ClauseKind::NotMatchedInsert => f.write_str("WHEN NOT MATCHED THEN INSERT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeAction {
    Delete,
    Update { set: Vec<SetClause> },
    Insert { columns: Vec<Fragment>, values: Vec<Expression> },
}

/// One `SET column = value` assignment of an UPDATE action. The column is
/// always a target column and is written unqualified in the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub column: Fragment,
    pub value: Expression,
}
