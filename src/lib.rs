//! Manifest-driven file patching.
//!
//! Three phases share one manifest: **build** records every tracked path
//! with a content fingerprint and stages a copy into the package, **patch**
//! brings the live system back in line with the package (backing up
//! whatever it replaces), and **restore** puts those backups back.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]** and **[`manifest`]**: tool root layout, tracked paths and the on-disk record format
//! - **[`resources`]**: idempotent `check + apply` primitives for one path
//! - **[`tasks`]**: the three phases wired to resources
//! - **[`commands`]**: top-level subcommand orchestration and the interactive menu
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod platform;
pub mod resources;
pub mod tasks;
