// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A piece of statement text carried through compilation so that errors can
/// point at the offending identifier. `Internal` fragments mark identifiers
/// synthesized by the compiler itself, which have no statement position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    None,
    Statement { text: String, offset: u32 },
    Internal { text: String },
}

impl Fragment {
    pub fn statement(text: impl Into<String>, offset: u32) -> Self {
        Fragment::Statement { text: text.into(), offset }
    }

    pub fn internal(text: impl Into<String>) -> Self {
        Fragment::Internal { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Fragment::None => "",
            Fragment::Statement { text, .. } => text,
            Fragment::Internal { text } => text,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Fragment::Internal { .. })
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
