// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! AST subsystem: immutable statement trees handed over by the parser

#[allow(clippy::module_inception)]
mod ast;
pub use ast::*;
pub mod formatter;

pub use formatter::format_statement;
