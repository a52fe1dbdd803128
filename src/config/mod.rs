pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use crate::core::Format;
    use crate::utils::error::{CookbookError, Result};
    use crate::utils::validation::{self, Validate};
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "cookbook-convert")]
    #[command(about = "Convert a cookbook between the structured and delimited formats")]
    pub struct CliConfig {
        /// Cookbook to read, relative to the storage base path
        #[arg(long)]
        pub input: String,

        /// Where to write the converted cookbook
        #[arg(long)]
        pub output: String,

        /// Input format (defaults to the input file extension)
        #[arg(long, value_enum)]
        pub from: Option<Format>,

        /// Output format (defaults to the output file extension)
        #[arg(long, value_enum)]
        pub to: Option<Format>,

        /// Export only the recipe with this name
        #[arg(long)]
        pub recipe: Option<String>,

        /// Path to TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    fn resolve(field: &str, path: &str, explicit: Option<Format>) -> Result<Format> {
        if let Some(format) = explicit {
            return Ok(format);
        }
        validation::validate_file_extensions(field, &[path.to_string()], &["json", "txt", "csv"])?;
        Format::from_path(path).ok_or_else(|| CookbookError::InvalidConfigValueError {
            field: field.to_string(),
            value: path.to_string(),
            reason: "cannot infer format from extension".to_string(),
        })
    }

    impl CliConfig {
        pub fn input_format(&self) -> Result<Format> {
            resolve("input", &self.input, self.from)
        }

        pub fn output_format(&self) -> Result<Format> {
            resolve("output", &self.output, self.to)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("input", &self.input)?;
            validation::validate_path("output", &self.output)?;
            self.input_format()?;
            self.output_format()?;
            if let Some(recipe) = &self.recipe {
                validation::validate_non_empty_string("recipe", recipe)?;
            }
            Ok(())
        }
    }

}
