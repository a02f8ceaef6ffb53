pub mod toml_loader;

pub use toml_loader::{load_all_manifests, load_submission_manifest};
