//! Rendering helpers: Java-like source for previews and markdown for human-readable artifacts.

mod markdown;
mod source;

pub use markdown::{CANDIDATES_HEADING, render_apply_md, render_candidates, render_plan_md};
pub use source::{render_class, render_unit};
