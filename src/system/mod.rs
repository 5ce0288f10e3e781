//! # System Interaction Layer
//!
//! This module is the boundary between the core logic and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: spawns external commands (tokenized with `shlex`, never through a
//!   shell) and defines the [`executor::Launcher`] seam used by actions.
//! - **`opener`**: picks the program that opens files with their default application.

pub mod executor;
pub mod opener;
