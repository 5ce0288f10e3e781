// src/cli/handlers/mod.rs

pub mod add;
pub mod add_path;
pub mod commons;
pub mod ls;
pub mod pl;
pub mod remove;
pub mod use_bucket;
