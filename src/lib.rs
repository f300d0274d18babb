//! Idempotent single-host provisioning engine.
//!
//! A plan of ordered phases, each a list of named steps, is loaded from TOML
//! (the built-in `conf/plan.toml` unless another file is given). Every step
//! carries an optional skip condition over read-only host facts and a body
//! of actions; a step whose condition holds is skipped, so re-running a plan
//! only does the work that is still missing.
//!
//! The public API is organised into layers:
//!
//! - **[`facts`]**: read-only host queries and their per-step memoisation
//! - **[`actions`]**: the imperative primitives (shell, download, symlink, packages, clone)
//! - **[`steps`]**: steps, preconditions and the step runner
//! - **[`orchestrator`]**: ordered execution of phases and the run report
//! - **[`config`]**: plan parsing, expansion and validation
//! - **[`commands`]**: top-level subcommand handlers (`install`, `list`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod facts;
pub mod logging;
pub mod orchestrator;
pub mod platform;
pub mod steps;
