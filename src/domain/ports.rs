use crate::domain::model::{Cookbook, Recipe};
use crate::utils::error::Result;

/// Byte sink/source addressed by relative path.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

/// A bidirectional transform between the domain model and one byte format.
///
/// Implementations are stateless apart from their options: every call works
/// on its own input and returns a complete buffer or an error.
pub trait Codec: Send + Sync {
    /// Human-readable format name, used in log output.
    fn name(&self) -> &'static str;

    fn encode_cookbook(&self, cookbook: &Cookbook) -> Result<Vec<u8>>;
    fn decode_cookbook(&self, bytes: &[u8]) -> Result<Cookbook>;

    fn encode_recipe(&self, recipe: &Recipe) -> Result<Vec<u8>>;
    fn decode_recipe(&self, bytes: &[u8]) -> Result<Recipe>;
}
