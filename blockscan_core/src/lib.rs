//! `blockscan_core` finds the top-level blocks of Jinja-style template
//! source: the `{% macro %}`, `{% snapshot %}`, `{% materialization %}` and
//! `{% docs %}` regions (or any other tag names you choose) together with
//! their labels, contents, and positions. Template expressions are never
//! evaluated. Only block boundaries are found.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template source
//!   -> Lexer (skips comments, expressions, strings and raw regions; yields statement tags)
//!   -> Extractor (tracks block and control-flow nesting; emits top-level blocks)
//!   -> Project scanner (walks a directory tree; rejects duplicate definitions)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: configuration loading from `blockscan.toml`.
//! - [`project`]: directory walking and per-file extraction.
//!
//! ## Key Types
//!
//! - [`Block`]: a tag block or a run of raw text between blocks.
//! - [`BlockNames`]: the set of tag names that open a block.
//! - [`BlockscanError`]: every failure, with the exact message and a
//!   [`miette`] diagnostic code.
//!
//! ## Quick Start
//!
//! ```rust
//! use blockscan_core::BlockNames;
//! use blockscan_core::extract_toplevel_blocks;
//!
//! let source = "select 1\n{% macro my_macro(a) %}{{ a }}{% endmacro %}\n";
//! let names = BlockNames::default();
//! let blocks = extract_toplevel_blocks(source, &names, true)?;
//!
//! assert_eq!(blocks.len(), 3);
//! assert!(blocks[0].is_data());
//! assert_eq!(blocks[1].tag_name, "macro");
//! assert_eq!(blocks[1].contents, "{{ a }}");
//! # Ok::<(), blockscan_core::BlockscanError>(())
//! ```

pub use error::*;
pub use parser::*;
pub use position::*;

pub mod config;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod parser;
mod position;
pub mod project;
pub(crate) mod tokens;

#[cfg(test)]
mod __fixtures;
