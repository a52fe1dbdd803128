pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{LocalStorage, MemoryStorage};
pub use crate::config::toml_config::CookbookConfig;
pub use crate::core::delimited::{DelimitedCodec, DelimitedLayout};
pub use crate::core::driver::CodecDriver;
pub use crate::core::structured::{MissingFavorite, StructuredCodec};
pub use crate::core::{DecodeOptions, Format};
pub use crate::domain::model::{Cookbook, Ingredient, Recipe};
pub use crate::domain::ports::{Codec, Storage};
pub use crate::utils::error::{CookbookError, ErrorCategory, Location, Result};
