// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! MERGE statement compilation for Conflux.
//!
//! This crate provides:
//! - The parsed statement shape via the [`ast`] module
//! - Binding, namespace resolution, projection assembly and privilege
//!   collection via the [`bind`] module
//! - Bound expressions via the [`expression`] module
//! - Optimization and runtime-plan emission via the [`plan`] module
//! - The whole pipeline via [`compile_merge`]

pub mod ast;
pub mod bind;
pub mod error;
pub mod expression;
pub mod plan;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub use bind::{BoundMerge, bind_merge};
pub use plan::{MergeCompilation, MergePlan, compile_merge};
