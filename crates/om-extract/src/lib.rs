mod identity;
mod loader;

pub use identity::{derive_project_id, derive_project_key, extract};
pub use loader::{clean_text, load_transcript};
