//! buildmatrix core library.
//!
//! This library expands declarative target descriptions (sources, dependency
//! labels, a matrix of build variants and optional aliases) into the ordered
//! statement stream a Ninja build consumes. [`project`] loads a `Matrixfile`,
//! [`ir::compile_project`] runs one compilation pass and [`ninja_gen`]
//! renders the result.

pub mod ast;
pub mod canon;
pub mod cli;
pub mod graph;
pub mod hasher;
pub mod ir;
pub mod manifest;
pub mod ninja_gen;
pub mod project;
pub mod runner;
pub mod variant;
