//! edgebundle: hierarchical edge bundling
//!
//! Layered architecture:
//! - `domain`: hierarchy, links, curve subdivision, layout and colors
//! - `application`: the bundling service
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
