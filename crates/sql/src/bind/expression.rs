// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use conflux_catalog::CatalogTx;
use conflux_core::Fragment;

use crate::bind::namespace::{FromPair, Lookup};
use crate::expression::{
    AddExpression, AndExpression, CallExpression, CastExpression, ColumnBinding, ColumnExpression,
    CompareExpression, DivideExpression, Expression, MultiplyExpression, NotExpression,
    OrExpression, SubtractExpression,
};

/// Bind an expression against a two-table namespace, returning a new owned
/// tree with every column and routine reference resolved. The input is left
/// untouched; binding against a disposable namespace can never leak state
/// into the shared one.
pub fn bind_expression(
    catalog: &mut impl CatalogTx,
    namespace: &FromPair,
    expression: &Expression,
) -> crate::Result<Expression> {
    Ok(match expression {
        Expression::Constant(constant) => Expression::Constant(constant.clone()),
        Expression::Column(column) => Expression::Column(bind_column(namespace, column)?),
        Expression::Add(AddExpression { left, right, fragment }) => {
            Expression::Add(AddExpression {
                left: Box::new(bind_expression(catalog, namespace, left)?),
                right: Box::new(bind_expression(catalog, namespace, right)?),
                fragment: fragment.clone(),
            })
        }
        Expression::Subtract(SubtractExpression { left, right, fragment }) => {
            Expression::Subtract(SubtractExpression {
                left: Box::new(bind_expression(catalog, namespace, left)?),
                right: Box::new(bind_expression(catalog, namespace, right)?),
                fragment: fragment.clone(),
            })
        }
        Expression::Multiply(MultiplyExpression { left, right, fragment }) => {
            Expression::Multiply(MultiplyExpression {
                left: Box::new(bind_expression(catalog, namespace, left)?),
                right: Box::new(bind_expression(catalog, namespace, right)?),
                fragment: fragment.clone(),
            })
        }
        Expression::Divide(DivideExpression { left, right, fragment }) => {
            Expression::Divide(DivideExpression {
                left: Box::new(bind_expression(catalog, namespace, left)?),
                right: Box::new(bind_expression(catalog, namespace, right)?),
                fragment: fragment.clone(),
            })
        }
        Expression::Compare(CompareExpression { op, left, right, fragment }) => {
            Expression::Compare(CompareExpression {
                op: *op,
                left: Box::new(bind_expression(catalog, namespace, left)?),
                right: Box::new(bind_expression(catalog, namespace, right)?),
                fragment: fragment.clone(),
            })
        }
        Expression::And(AndExpression { left, right, fragment }) => {
            Expression::And(AndExpression {
                left: Box::new(bind_expression(catalog, namespace, left)?),
                right: Box::new(bind_expression(catalog, namespace, right)?),
                fragment: fragment.clone(),
            })
        }
        Expression::Or(OrExpression { left, right, fragment }) => {
            Expression::Or(OrExpression {
                left: Box::new(bind_expression(catalog, namespace, left)?),
                right: Box::new(bind_expression(catalog, namespace, right)?),
                fragment: fragment.clone(),
            })
        }
        Expression::Not(NotExpression { expression, fragment }) => {
            Expression::Not(NotExpression {
                expression: Box::new(bind_expression(catalog, namespace, expression)?),
                fragment: fragment.clone(),
            })
        }
        Expression::Call(CallExpression { name, args, fragment, .. }) => {
            let binding = catalog
                .find_routine_by_name(name.text())?
                .ok_or_else(|| crate::Error::RoutineNotFound { name: name.clone() })?;
            let args = args
                .iter()
                .map(|arg| bind_expression(catalog, namespace, arg))
                .collect::<crate::Result<Vec<_>>>()?;
            Expression::Call(CallExpression {
                name: name.clone(),
                args,
                binding: Some(binding),
                fragment: fragment.clone(),
            })
        }
        Expression::Cast(CastExpression { expression, to, fragment }) => {
            Expression::Cast(CastExpression {
                expression: Box::new(bind_expression(catalog, namespace, expression)?),
                to: to.clone(),
                fragment: fragment.clone(),
            })
        }
    })
}

/// Resolve one column reference. Unqualified references are rewritten to
/// carry the exposed name of the side that resolved them, so that later
/// passes only ever see qualified references.
fn bind_column(namespace: &FromPair, column: &ColumnExpression) -> crate::Result<ColumnExpression> {
    let qualifier = column.table.as_ref().map(|table| table.text().to_string());
    let (side, def) = match namespace.lookup(qualifier.as_deref(), column.name.text()) {
        Lookup::Source(def) => (&namespace.source, def),
        Lookup::Target(def) => (&namespace.target, def),
        Lookup::Ambiguous => {
            return Err(crate::Error::AmbiguousColumn { column: column.name.clone() });
        }
        Lookup::NotFound | Lookup::ForeignQualifier => {
            return Err(crate::Error::ColumnNotFound { column: column.name.clone() });
        }
    };

    Ok(ColumnExpression {
        table: Some(
            column
                .table
                .clone()
                .unwrap_or_else(|| Fragment::internal(side.exposed_name.clone())),
        ),
        name: column.name.clone(),
        binding: Some(ColumnBinding {
            origin: side.origin,
            table: side.relation.table_id(),
            column: Some(def.clone()),
        }),
    })
}
