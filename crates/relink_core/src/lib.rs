//! Core conversion logic for `relink`: rename exported documents after
//! their first-line heading, drop trailing disambiguation tokens from
//! folder names, and rewrite every percent-encoded reference across the
//! corpus so internal links keep resolving after the rename.

pub mod config;
pub mod convert;
pub mod corpus;
pub mod extract;
pub mod folders;
pub mod rename;
pub mod rewrite;
pub mod runtime;
pub mod sanitize;
