// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use conflux_core::interface::{ColumnId, RoutineId, TableId};

use crate::expression::Expression;

/// One privilege the compiled statement requires. Collected during binding,
/// enforced elsewhere; the compiler only ever produces requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Privilege {
    Select { table: TableId, column: ColumnId },
    Execute { routine: RoutineId },
    Usage { ty: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeKind {
    Select,
    Execute,
    Usage,
}

/// The deduplicated privilege requirements of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeSet {
    privileges: BTreeSet<Privilege>,
}

impl PrivilegeSet {
    pub fn contains(&self, privilege: &Privilege) -> bool {
        self.privileges.contains(privilege)
    }

    pub fn len(&self) -> usize {
        self.privileges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.privileges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Privilege> {
        self.privileges.iter()
    }
}

/// Accumulates required privileges. Speculative binds run inside a
/// suppression scope during which every `require_*` call is dropped on the
/// floor; scopes nest and are released on every exit path by guard drop.
///
/// Requirements are added under a privilege-kind scope, one kind at a time.
#[derive(Debug, Default)]
pub struct PrivilegeCollector {
    suppression: Cell<u32>,
    kinds: RefCell<Vec<PrivilegeKind>>,
    required: RefCell<BTreeSet<Privilege>>,
}

impl PrivilegeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a suppression scope. Collection resumes when the guard drops.
    #[must_use]
    pub fn suppress(&self) -> SuppressionGuard<'_> {
        self.suppression.set(self.suppression.get() + 1);
        SuppressionGuard { collector: self }
    }

    /// Enter a privilege-kind scope for a batch of `require_*` calls.
    #[must_use]
    pub fn scope(&self, kind: PrivilegeKind) -> KindGuard<'_> {
        self.kinds.borrow_mut().push(kind);
        KindGuard { collector: self }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppression.get() > 0
    }

    pub fn require_column(&self, table: TableId, column: ColumnId) {
        debug_assert_eq!(self.current_kind(), Some(PrivilegeKind::Select));
        self.require(Privilege::Select { table, column });
    }

    pub fn require_routine(&self, routine: RoutineId) {
        debug_assert_eq!(self.current_kind(), Some(PrivilegeKind::Execute));
        self.require(Privilege::Execute { routine });
    }

    pub fn require_usage(&self, ty: impl Into<String>) {
        debug_assert_eq!(self.current_kind(), Some(PrivilegeKind::Usage));
        self.require(Privilege::Usage { ty: ty.into() });
    }

    /// Charge everything a bound expression requires: SELECT on resolved
    /// columns that carry a concrete column descriptor, EXECUTE on resolved
    /// routines, USAGE on referenced user-defined types. Synthesized columns
    /// carry no descriptor and are skipped.
    pub fn charge_expression(&self, expression: &Expression) {
        {
            let _scope = self.scope(PrivilegeKind::Select);
            for column in expression.columns() {
                if let Some(binding) = &column.binding {
                    if let (Some(table), Some(def)) = (binding.table, binding.column.as_ref()) {
                        self.require_column(table, def.id);
                    }
                }
            }
        }
        {
            let _scope = self.scope(PrivilegeKind::Execute);
            for call in expression.routine_calls() {
                if let Some(routine) = &call.binding {
                    self.require_routine(routine.id);
                }
            }
        }
        {
            let _scope = self.scope(PrivilegeKind::Usage);
            for ty in expression.user_defined_types() {
                self.require_usage(ty.to_string());
            }
        }
    }

    pub fn finish(self) -> PrivilegeSet {
        debug_assert_eq!(self.suppression.get(), 0, "suppression scope left open");
        debug_assert!(self.kinds.borrow().is_empty(), "privilege kind scope left open");
        PrivilegeSet { privileges: self.required.into_inner() }
    }

    fn require(&self, privilege: Privilege) {
        if self.is_suppressed() {
            return;
        }
        self.required.borrow_mut().insert(privilege);
    }

    fn current_kind(&self) -> Option<PrivilegeKind> {
        self.kinds.borrow().last().copied()
    }
}

/// Releases one suppression level on drop, also when unwinding out of a
/// failed speculative bind.
#[derive(Debug)]
pub struct SuppressionGuard<'a> {
    collector: &'a PrivilegeCollector,
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        let depth = self.collector.suppression.get();
        debug_assert!(depth > 0);
        self.collector.suppression.set(depth - 1);
    }
}

#[derive(Debug)]
pub struct KindGuard<'a> {
    collector: &'a PrivilegeCollector,
}

impl Drop for KindGuard<'_> {
    fn drop(&mut self) {
        self.collector.kinds.borrow_mut().pop();
    }
}
