//! Output generation: Markdown rendering and dated digest files.
//!
//! # Submodules
//!
//! - [`markdown`]: Converts a `Digest` to a Markdown document
//! - [`writer`]: Writes that document to `<dir>/<YYYY-MM-DD>.md`, replacing any earlier run
//!
//! # Output Structure
//!
//! ```text
//! noticias/
//! ├── en/
//! │   └── 2025-05-06.md
//! └── es/
//!     └── 2025-05-06.md
//! ```

pub mod markdown;
pub mod writer;
