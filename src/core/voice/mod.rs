//! Voice catalog and tag resolution

mod catalog;
mod resolver;

pub use catalog::{
    CatalogError, DEFAULT_STYLE_TAG, STYLE_TAGS, SUPPORTED_SPEAKERS, VoiceCatalog, load_catalog,
};
pub use resolver::{ResolutionError, VoiceResolver};
