// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::plan::{ActionPlan, QueryPlan};

/// Cost-based rewriting of the pieces of a MERGE plan. The driving query is
/// optimized exactly once; each clause action is optimized on its own,
/// independently of the driving query and of its sibling clauses.
///
/// Plans pass through by value. An optimizer that has nothing to do returns
/// its input unchanged.
pub trait Optimizer {
    fn optimize_query(&mut self, query: QueryPlan) -> crate::Result<QueryPlan>;

    fn optimize_action(&mut self, action: ActionPlan) -> crate::Result<ActionPlan>;
}

/// Keeps every plan as built. The default for tests and for deployments
/// without a cost model.
#[derive(Debug, Default)]
pub struct PassThroughOptimizer;

impl Optimizer for PassThroughOptimizer {
    fn optimize_query(&mut self, query: QueryPlan) -> crate::Result<QueryPlan> {
        Ok(query)
    }

    fn optimize_action(&mut self, action: ActionPlan) -> crate::Result<ActionPlan> {
        Ok(action)
    }
}
