// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod fragment;
pub mod interface;
pub mod value;

pub use fragment::Fragment;
pub use value::Type;
