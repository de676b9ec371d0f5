mod fs_ops;
mod migrate;
mod rewrite;

pub use fs_ops::{collect_source_files, install_release_templates, is_source_file_name};
pub use migrate::{update_channels, MigrationReport};
pub use rewrite::{check_release_move, plan_source_rewrite, ReleaseLineMatcher, SourceRewrite};
