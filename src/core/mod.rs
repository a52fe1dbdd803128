pub mod delimited;
pub mod driver;
pub mod structured;

pub use crate::domain::model::{Cookbook, Ingredient, Recipe};
pub use crate::domain::ports::{Codec, Storage};
pub use crate::utils::error::Result;

use crate::utils::error::{CookbookError, Location};
use serde::{Deserialize, Serialize};
use std::path::Path;

const UTF8_BOM: &str = "\u{feff}";

/// On-disk encoding of a cookbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON object/array tree.
    Structured,
    /// `;`/`&` separated plaintext records.
    Delimited,
}

impl Format {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Structured),
            "txt" | "csv" => Some(Format::Delimited),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Structured => "json",
            Format::Delimited => "txt",
        }
    }
}

/// Value checks shared by both decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Accept ingredient amounts below zero.
    pub allow_negative_amounts: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            allow_negative_amounts: true,
        }
    }
}

impl DecodeOptions {
    pub(crate) fn check_amount(&self, amount: f64, location: &Location) -> Result<f64> {
        if !amount.is_finite() {
            return Err(CookbookError::format(
                location.clone(),
                format!("amount must be a finite number, found {}", amount),
            ));
        }
        if amount < 0.0 && !self.allow_negative_amounts {
            return Err(CookbookError::format(
                location.clone(),
                format!("negative amount {} is not allowed", amount),
            ));
        }
        Ok(amount)
    }
}

/// Decodes bytes as UTF-8, dropping a leading byte-order mark.
pub(crate) fn decode_text(bytes: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        CookbookError::encoding(
            Location::document(),
            format!("input is not valid UTF-8: {}", e),
        )
    })?;

    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => {
            tracing::warn!("Ignoring UTF-8 byte-order mark at start of input");
            Ok(rest)
        }
        None => Ok(text),
    }
}

pub(crate) fn check_recipe_name(name: &str, location: &Location) -> Result<()> {
    if name.is_empty() {
        return Err(CookbookError::format(
            location.clone(),
            "recipe name must not be empty",
        ));
    }
    Ok(())
}

pub(crate) fn check_ingredient_name(name: &str, location: &Location) -> Result<()> {
    if name.is_empty() {
        return Err(CookbookError::format(
            location.clone(),
            "ingredient name must not be empty",
        ));
    }
    Ok(())
}

/// Rejects recipe values that neither decoder accepts, reporting the same
/// location a decoder would.
pub(crate) fn check_encodable(recipe: &Recipe, location: &Location) -> Result<()> {
    if recipe.name().is_empty() {
        return Err(CookbookError::encoding(
            location.clone().field("Name"),
            "recipe name must not be empty",
        ));
    }
    if recipe.portions() == 0 {
        return Err(CookbookError::encoding(
            location.clone().field("Portions"),
            "portions must be positive, found 0",
        ));
    }
    if let Some(index) = recipe
        .ingredients()
        .iter()
        .position(|ingredient| ingredient.name().is_empty())
    {
        return Err(CookbookError::encoding(
            location.clone().ingredient(index).field("Name"),
            "ingredient name must not be empty",
        ));
    }
    Ok(())
}

/// Narrows a decoded portion count to the domain range `1..=u32::MAX`.
pub(crate) fn narrow_portions(value: i64, location: &Location) -> Result<u32> {
    if value <= 0 {
        return Err(CookbookError::format(
            location.clone(),
            format!("portions must be positive, found {}", value),
        ));
    }
    u32::try_from(value).map_err(|_| {
        CookbookError::format(
            location.clone(),
            format!("portions {} is out of range (max {})", value, u32::MAX),
        )
    })
}

/// Appends a decoded recipe, reporting a repeated name as a format error.
pub(crate) fn push_recipe(cookbook: &mut Cookbook, recipe: Recipe, location: Location) -> Result<()> {
    cookbook.add_recipe(recipe).map_err(|err| match err {
        CookbookError::DuplicateRecipe { name } => CookbookError::format(
            location.field("Name"),
            format!("recipe name '{}' appears more than once", name),
        ),
        other => other,
    })
}
