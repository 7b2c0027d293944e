//! Connectables: user-configured devices and the actions you can run on them.
//!
//! Devices ("leafs") and actions are plain YAML or TOML files under
//! `$XDG_CONFIG_HOME/kupfer/connectables/{leafs,actions}/`. A device lists the
//! actions it supports; an action either runs a shell command or opens a
//! URI, built from `%(key)s` templates filled in with the device's
//! attributes.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: configuration root and structured-data parsing
//! - **[`template`]**: `%(key)s` substitution
//! - **[`cache`]**: modification-time cache of action files
//! - **[`device`]** / **[`action`]**: the object model and dispatch
//! - **[`catalog`]**: the adapter a host drives
//! - **[`exec`]**: the launcher collaborators actions dispatch to
//! - **[`commands`]**: the CLI subcommands built on the above
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod action;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod exec;
pub mod logging;
pub mod template;
