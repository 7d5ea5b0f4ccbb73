// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! cwpl library
//!
//! This module exports the command line layer of cwpl for use in
//! integration tests and by the binary.

pub mod app;
pub mod config;
pub mod output;
