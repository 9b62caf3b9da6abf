// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod error;
mod transaction;
pub mod test_utils;

pub use error::Error;
pub use transaction::CatalogTx;

pub type Result<T> = std::result::Result<T, Error>;
