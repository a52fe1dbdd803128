use crate::core::delimited::DelimitedCodec;
use crate::core::structured::StructuredCodec;
use crate::core::{Codec, Cookbook, Format, Recipe, Storage};
use crate::utils::error::{CookbookError, Result};
use std::io::{Read, Write};

const STREAM: &str = "<stream>";

/// Loads and saves cookbooks through a [`Storage`] using either codec.
pub struct CodecDriver<S: Storage> {
    storage: S,
    structured: StructuredCodec,
    delimited: DelimitedCodec,
}

impl<S: Storage> CodecDriver<S> {
    pub fn new(storage: S) -> Self {
        Self::with_codecs(storage, StructuredCodec::default(), DelimitedCodec::default())
    }

    pub fn with_codecs(storage: S, structured: StructuredCodec, delimited: DelimitedCodec) -> Self {
        Self {
            storage,
            structured,
            delimited,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn codec(&self, format: Format) -> &dyn Codec {
        match format {
            Format::Structured => &self.structured,
            Format::Delimited => &self.delimited,
        }
    }

    pub fn save_cookbook(&self, path: &str, cookbook: &Cookbook, format: Format) -> Result<()> {
        let codec = self.codec(format);
        // Encode fully before touching the sink.
        let data = codec.encode_cookbook(cookbook)?;
        self.storage.write_file(path, &data)?;

        tracing::info!(
            "Saved cookbook '{}' ({} recipes) to {} as {}",
            cookbook.name(),
            cookbook.len(),
            path,
            codec.name()
        );
        Ok(())
    }

    pub fn load_cookbook(&self, path: &str, format: Format) -> Result<Cookbook> {
        let codec = self.codec(format);
        let data = self.storage.read_file(path)?;
        tracing::debug!("Read {} bytes from {}", data.len(), path);

        let cookbook = codec.decode_cookbook(&data)?;
        tracing::info!(
            "Loaded cookbook '{}' ({} recipes) from {} as {}",
            cookbook.name(),
            cookbook.len(),
            path,
            codec.name()
        );
        Ok(cookbook)
    }

    pub fn save_recipe(&self, path: &str, recipe: &Recipe, format: Format) -> Result<()> {
        let codec = self.codec(format);
        let data = codec.encode_recipe(recipe)?;
        self.storage.write_file(path, &data)?;

        tracing::info!("Saved recipe '{}' to {} as {}", recipe.name(), path, codec.name());
        Ok(())
    }

    pub fn load_recipe(&self, path: &str, format: Format) -> Result<Recipe> {
        let data = self.storage.read_file(path)?;
        let recipe = self.codec(format).decode_recipe(&data)?;

        tracing::info!("Loaded recipe '{}' from {}", recipe.name(), path);
        Ok(recipe)
    }

    /// Encodes into a complete buffer, then writes it to `writer` in one call.
    pub fn write_cookbook<W: Write>(
        &self,
        writer: &mut W,
        cookbook: &Cookbook,
        format: Format,
    ) -> Result<()> {
        let data = self.codec(format).encode_cookbook(cookbook)?;
        writer
            .write_all(&data)
            .and_then(|_| writer.flush())
            .map_err(|e| CookbookError::io(STREAM, e))?;

        tracing::debug!("Wrote {} bytes of {:?} cookbook to stream", data.len(), format);
        Ok(())
    }

    pub fn read_cookbook<R: Read>(&self, reader: &mut R, format: Format) -> Result<Cookbook> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| CookbookError::io(STREAM, e))?;

        self.codec(format).decode_cookbook(&data)
    }
}
