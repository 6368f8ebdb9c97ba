//! Clap-free settings for the pipelines.

use buildergen_types::plan::FieldScope;

#[derive(Debug, Clone)]
pub struct Settings {
    pub field_scope: FieldScope,

    /// Compute and report, but never commit.
    pub dry_run: bool,

    /// Record the target fingerprint in plans and refuse stale plans on apply.
    pub require_clean_hashes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_scope: FieldScope::Inherited,
            dry_run: false,
            require_clean_hashes: true,
        }
    }
}
