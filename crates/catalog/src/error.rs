// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("catalog lookup for '{name}' failed: {reason}")]
    LookupFailed { name: String, reason: String },
}
