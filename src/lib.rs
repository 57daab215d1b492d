// SPDX-License-Identifier: MPL-2.0

//! Tabbed sticky notes: an ordered note store, its YAML persistence and
//! search within and across notes, driven through [`app::AppSession`].

pub mod app;
pub mod config;
pub mod notes;
pub mod storage;
