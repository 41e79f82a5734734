//! File system helpers shared by the project and state layers.
//!
//! - [`fs`] - atomic writes, directory creation and upward file discovery

pub mod fs;

pub use fs::{atomic_write, ensure_dir, find_upwards, read_text_file, safe_write};
