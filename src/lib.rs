//! momo: a tiny command-line file manager over YAML buckets.
//!
//! A bucket is a YAML document viewed as a tree of nodes and attributes.
//! Elements are addressed by name or by their position in a listing, and the
//! resolved element can be listed, opened, or used to run commands.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod dev_utils;
pub mod models;
pub mod state;
pub mod system;
