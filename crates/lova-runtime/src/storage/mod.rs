//! Artifact persistence

mod artifacts;

pub use artifacts::{
    ArtifactStore, ITEM_FACTORS_FILE, ITEM_INDEX_FILE, USER_FACTORS_FILE, USER_INDEX_FILE,
};
