// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::value::Type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDef {
    pub id: RoutineId,
    pub name: String,
    pub returns: Type,
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
pub struct RoutineId(pub u64);

impl Deref for RoutineId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<u64> for RoutineId {
    fn eq(&self, other: &u64) -> bool {
        self.0.eq(other)
    }
}

impl From<RoutineId> for u64 {
    fn from(value: RoutineId) -> Self {
        value.0
    }
}
