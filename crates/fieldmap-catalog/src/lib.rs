#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod loader;
pub mod shared;

pub use catalog::{Catalog, CatalogView, FieldPos, SynonymHit};
pub use error::{CatalogError, Result};
pub use loader::{
    DICTIONARY_ENV_VAR, default_dictionary_root, load_catalog_dir, load_catalog_json,
    load_default_catalog, read_csv_rows,
};
pub use shared::SharedCatalog;
