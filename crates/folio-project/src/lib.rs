//! A Folio project on disk: one SQLite database plus the narrative and world
//! content directories next to it.
//!
//! [`Project`] is the open session over one such directory. Every mutation
//! writes the database first and then performs its filesystem side effect on
//! a best-effort basis; a failed side effect is logged and never rolls the
//! database back. [`Session`] holds at most one open project and owns the
//! event channel subscribers listen on.

pub mod content;
pub mod details;
pub mod error;
pub mod layout;
pub mod project;
pub mod session;

pub use content::ContentStore;
pub use error::{Error, Result};
pub use layout::ProjectLayout;
pub use project::Project;
pub use session::Session;
