// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! From bound statement to runtime plan. [`MergeCompilation`] walks the
//! statement through its phases in a fixed order; calling a phase out of
//! order is a programming error and panics. [`compile_merge`] is the
//! one-call entry covering the whole pipeline.

pub mod optimize;

use conflux_catalog::CatalogTx;
use tracing::instrument;

use crate::ast::{ClauseKind, MergeStatement};
use crate::bind::clause::BoundAction;
use crate::bind::driving::DrivingJoin;
use crate::bind::privilege::PrivilegeSet;
use crate::bind::projection::ProjectionList;
use crate::bind::{BoundMerge, bind_merge};
use crate::expression::Expression;
use crate::plan::optimize::Optimizer;

/// The driving scan of a MERGE: the synthesized left-outer join and the
/// projection its rows carry, row-location sentinel included.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub join: DrivingJoin,
    pub projection: ProjectionList,
}

/// One clause action over a buffered driving row.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPlan {
    pub kind: ClauseKind,
    pub refinement: Option<Expression>,
    pub action: BoundAction,
    /// Offsets of the columns this action reads, into the driving row.
    pub column_offsets: Vec<usize>,
}

/// The executable shape of a MERGE. Execution runs the driving scan to
/// completion, buffering every driving row together with its clause routing,
/// before any action touches the target table; actions seeing their own
/// scan's effects would otherwise re-match rows they just changed.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub driving_scan: QueryPlan,
    pub clauses: Vec<ActionPlan>,
    pub routing: RowRouting,
    /// Offset of the row-location sentinel in the driving row. The column is
    /// non-null exactly when the source row matched a target row.
    pub row_location_index: usize,
    pub privileges: PrivilegeSet,
}

/// Decides which clause, if any, consumes a driving row. Clauses are probed
/// in statement order; the first whose kind accepts the row's match state and
/// whose refinement holds wins, at most one clause per row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRouting {
    entries: Vec<(ClauseKind, Option<Expression>)>,
}

impl RowRouting {
    fn new(clauses: &[ActionPlan]) -> Self {
        Self {
            entries: clauses
                .iter()
                .map(|clause| (clause.kind, clause.refinement.clone()))
                .collect(),
        }
    }

    /// Route one driving row. `matched` is the row's match state, `eval`
    /// evaluates a refinement against the row. Returns the index of the
    /// winning clause.
    pub fn route<E>(&self, matched: bool, mut eval: E) -> crate::Result<Option<usize>>
    where
        E: FnMut(&Expression) -> crate::Result<bool>,
    {
        for (index, (kind, refinement)) in self.entries.iter().enumerate() {
            if !kind.accepts(matched) {
                continue;
            }
            let holds = match refinement {
                Some(refinement) => eval(refinement)?,
                None => true,
            };
            if holds {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}

#[derive(Debug)]
enum Phase {
    Bound(BoundMerge),
    Optimized {
        driving_scan: QueryPlan,
        clauses: Vec<ActionPlan>,
        privileges: PrivilegeSet,
    },
    Generated,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Bound(_) => "bound",
            Phase::Optimized { .. } => "optimized",
            Phase::Generated => "generated",
        }
    }
}

/// One MERGE compilation in flight. Phases run strictly in order: bind,
/// optimize, generate.
#[derive(Debug)]
pub struct MergeCompilation {
    phase: Phase,
}

impl MergeCompilation {
    pub fn bind(
        catalog: &mut impl CatalogTx,
        statement: &MergeStatement,
    ) -> crate::Result<MergeCompilation> {
        let bound = bind_merge(catalog, statement)?;
        Ok(MergeCompilation { phase: Phase::Bound(bound) })
    }

    pub fn bound(&self) -> Option<&BoundMerge> {
        match &self.phase {
            Phase::Bound(bound) => Some(bound),
            _ => None,
        }
    }

    /// Optimize the driving query once, then every clause action
    /// independently.
    ///
    /// # Panics
    /// Panics when called on anything but a freshly bound compilation.
    pub fn optimize(&mut self, optimizer: &mut impl Optimizer) -> crate::Result<()> {
        let bound = match std::mem::replace(&mut self.phase, Phase::Generated) {
            Phase::Bound(bound) => bound,
            other => {
                panic!("optimize requires a bound compilation, this one is {}", other.name())
            }
        };

        let driving_scan = optimizer.optimize_query(QueryPlan {
            join: bound.driving,
            projection: bound.projection,
        })?;

        let clauses = bound
            .clauses
            .into_iter()
            .map(|clause| {
                optimizer.optimize_action(ActionPlan {
                    kind: clause.kind,
                    refinement: clause.refinement,
                    action: clause.action,
                    column_offsets: clause.column_offsets,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        self.phase = Phase::Optimized { driving_scan, clauses, privileges: bound.privileges };
        Ok(())
    }

    /// Emit the runtime plan, consuming the optimized pieces.
    ///
    /// # Panics
    /// Panics when called on anything but an optimized compilation.
    pub fn generate(&mut self) -> MergePlan {
        let (driving_scan, clauses, privileges) =
            match std::mem::replace(&mut self.phase, Phase::Generated) {
                Phase::Optimized { driving_scan, clauses, privileges } => {
                    (driving_scan, clauses, privileges)
                }
                other => panic!(
                    "generate requires an optimized compilation, this one is {}",
                    other.name()
                ),
            };

        let routing = RowRouting::new(&clauses);
        let row_location_index = driving_scan.projection.row_location_index();

        MergePlan { driving_scan, clauses, routing, row_location_index, privileges }
    }
}

/// Compile a MERGE statement front to back.
#[instrument(skip_all, fields(clauses = statement.clauses.len()))]
pub fn compile_merge(
    catalog: &mut impl CatalogTx,
    statement: &MergeStatement,
    optimizer: &mut impl Optimizer,
) -> crate::Result<MergePlan> {
    let mut compilation = MergeCompilation::bind(catalog, statement)?;
    compilation.optimize(optimizer)?;
    Ok(compilation.generate())
}

#[cfg(test)]
mod tests {
    use conflux_catalog::test_utils::TestCatalog;
    use conflux_core::{Fragment, Type};

    use crate::ast::{MatchingClause, MergeStatement, SetClause, TableRef};
    use crate::expression::{
        ColumnExpression, CompareExpression, CompareOp, ConstantExpression, Expression,
    };
    use crate::plan::optimize::PassThroughOptimizer;

    use super::*;

    fn catalog() -> TestCatalog {
        TestCatalog::new()
            .with_table("src", &[("id", Type::Int8), ("qty", Type::Int4)])
            .with_keyed_table("tgt", &[("id", Type::Int8), ("qty", Type::Int4)], &["id"])
    }

    fn column(table: &str, name: &str) -> Expression {
        Expression::Column(ColumnExpression::new(
            Some(Fragment::internal(table)),
            Fragment::internal(name),
        ))
    }

    fn statement(clauses: Vec<MatchingClause>) -> MergeStatement {
        MergeStatement {
            target: TableRef::named("tgt"),
            source: TableRef::named("src").with_alias("s"),
            on: Expression::Compare(CompareExpression {
                op: CompareOp::Eq,
                left: Box::new(column("s", "id")),
                right: Box::new(column("tgt", "id")),
                fragment: Fragment::None,
            }),
            clauses,
        }
    }

    fn refine_true() -> Expression {
        Expression::Constant(ConstantExpression::Bool(Fragment::internal("true")))
    }

    mod compile_merge {
        use super::*;

        #[test]
        fn test_ok() {
            let mut catalog = catalog();
            let stmt = statement(vec![
                MatchingClause::update(
                    None,
                    vec![SetClause {
                        column: Fragment::internal("qty"),
                        value: column("s", "qty"),
                    }],
                ),
                MatchingClause::insert(
                    None,
                    vec![Fragment::internal("id"), Fragment::internal("qty")],
                    vec![column("s", "id"), column("s", "qty")],
                ),
            ]);

            let plan =
                compile_merge(&mut catalog, &stmt, &mut PassThroughOptimizer).unwrap();

            assert_eq!(plan.clauses.len(), 2);
            assert_eq!(
                plan.row_location_index,
                plan.driving_scan.projection.len() - 1
            );
        }
    }

    mod phases {
        use super::*;

        #[test]
        #[should_panic(expected = "generate requires an optimized compilation")]
        fn test_generate_before_optimize() {
            let mut catalog = catalog();
            let stmt = statement(vec![MatchingClause::delete(None)]);
            let mut compilation = MergeCompilation::bind(&mut catalog, &stmt).unwrap();
            compilation.generate();
        }

        #[test]
        #[should_panic(expected = "optimize requires a bound compilation")]
        fn test_optimize_twice() {
            let mut catalog = catalog();
            let stmt = statement(vec![MatchingClause::delete(None)]);
            let mut compilation = MergeCompilation::bind(&mut catalog, &stmt).unwrap();
            assert!(compilation.bound().is_some());
            compilation.optimize(&mut PassThroughOptimizer).unwrap();
            assert!(compilation.bound().is_none());
            compilation.optimize(&mut PassThroughOptimizer).unwrap();
        }
    }

    mod routing {
        use super::*;

        fn plan_for(clauses: Vec<MatchingClause>) -> MergePlan {
            let mut catalog = catalog();
            let stmt = statement(clauses);
            compile_merge(&mut catalog, &stmt, &mut PassThroughOptimizer).unwrap()
        }

        #[test]
        fn test_first_eligible_wins() {
            let plan = plan_for(vec![
                MatchingClause::delete(Some(refine_true())),
                MatchingClause::update(
                    None,
                    vec![SetClause {
                        column: Fragment::internal("qty"),
                        value: column("s", "qty"),
                    }],
                ),
            ]);

            let winner = plan.routing.route(true, |_| Ok(true)).unwrap();
            assert_eq!(winner, Some(0));
        }

        #[test]
        fn test_refinement_skips_to_next() {
            let plan = plan_for(vec![
                MatchingClause::delete(Some(refine_true())),
                MatchingClause::update(
                    None,
                    vec![SetClause {
                        column: Fragment::internal("qty"),
                        value: column("s", "qty"),
                    }],
                ),
            ]);

            // the first clause's refinement does not hold for this row
            let mut calls = 0;
            let winner = plan
                .routing
                .route(true, |_| {
                    calls += 1;
                    Ok(calls > 1)
                })
                .unwrap();
            assert_eq!(winner, Some(1));
        }

        #[test]
        fn test_match_state_filters_kinds() {
            let plan = plan_for(vec![
                MatchingClause::delete(None),
                MatchingClause::insert(
                    None,
                    vec![Fragment::internal("id"), Fragment::internal("qty")],
                    vec![column("s", "id"), column("s", "qty")],
                ),
            ]);

            assert_eq!(plan.routing.route(true, |_| Ok(true)).unwrap(), Some(0));
            assert_eq!(plan.routing.route(false, |_| Ok(true)).unwrap(), Some(1));
        }

        #[test]
        fn test_no_eligible_clause() {
            let plan = plan_for(vec![MatchingClause::delete(None)]);
            assert_eq!(plan.routing.route(false, |_| Ok(true)).unwrap(), None);
        }

        #[test]
        fn test_eval_error_propagates() {
            let plan = plan_for(vec![MatchingClause::delete(Some(refine_true()))]);
            let err = plan
                .routing
                .route(true, |_| Err(crate::Error::Optimizer("bad row".to_string())))
                .unwrap_err();
            assert!(matches!(err, crate::Error::Optimizer(_)));
        }
    }
}
