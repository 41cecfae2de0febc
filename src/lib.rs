//! # shelvcmp
//!
//! Compare the pending changes of two shelvesets: which files match, which
//! differ in content and which exist on one side only.
//!
//! ## Modules
//!
//! - `compare`: the diff engine (matching, content comparison, summary)
//! - `vcs`: version control boundary and the git-backed shelveset store
//! - `session`: comparison state with change notifications
//! - `config`: persisted settings

pub mod app;
pub mod cli;
pub mod compare;
pub mod config;
pub mod models;
pub mod session;
pub mod vcs;
