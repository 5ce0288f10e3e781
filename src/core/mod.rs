// src/core/mod.rs

pub mod actions;
pub mod bucket;
pub mod commons;
pub mod document;
pub mod indexer;
pub mod listing;
pub mod paths;
pub mod plugins;
pub mod search;
pub mod settings;
pub mod sorting;
pub mod template;
pub mod tree;
