pub mod essay_store;

pub use essay_store::{EssayStore, SqliteEssayStore};
