use std::fmt;
use thiserror::Error;

/// Where in a document a decode or encode failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub recipe: Option<usize>,
    pub ingredient: Option<usize>,
    pub field: Option<&'static str>,
    pub line: Option<usize>,
}

impl Location {
    pub fn document() -> Self {
        Self::default()
    }

    pub fn recipe(index: usize) -> Self {
        Self {
            recipe: Some(index),
            ..Self::default()
        }
    }

    pub fn line(line: usize) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }

    pub fn ingredient(mut self, index: usize) -> Self {
        self.ingredient = Some(index);
        self
    }

    pub fn field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(recipe) = self.recipe {
            parts.push(format!("recipe #{}", recipe));
        }
        if let Some(ingredient) = self.ingredient {
            parts.push(format!("ingredient #{}", ingredient));
        }
        if let Some(field) = self.field {
            parts.push(format!("field {}", field));
        }
        if let Some(line) = self.line {
            parts.push(format!("line {}", line));
        }

        if parts.is_empty() {
            write!(f, "document")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

#[derive(Error, Debug)]
pub enum CookbookError {
    #[error("IO error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Format error at {location}: {message}")]
    FormatError { location: Location, message: String },

    #[error("Encoding error at {location}: {message}")]
    EncodingError { location: Location, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Recipe '{name}' already exists in the cookbook")]
    DuplicateRecipe { name: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidDomainValue { field: &'static str, reason: String },
}

/// Coarse classification of a [`CookbookError`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Format,
    Encoding,
    Config,
    Domain,
}

impl CookbookError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn format(location: Location, message: impl Into<String>) -> Self {
        Self::FormatError {
            location,
            message: message.into(),
        }
    }

    pub fn encoding(location: Location, message: impl Into<String>) -> Self {
        Self::EncodingError {
            location,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError { .. } => ErrorCategory::Io,
            Self::FormatError { .. } => ErrorCategory::Format,
            Self::EncodingError { .. } => ErrorCategory::Encoding,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
            Self::DuplicateRecipe { .. } | Self::InvalidDomainValue { .. } => {
                ErrorCategory::Domain
            }
        }
    }

    /// The failing position inside the document, for format and encoding errors.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::FormatError { location, .. } | Self::EncodingError { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError { path, .. } => format!("Could not access '{}'", path),
            Self::FormatError { location, message } => {
                format!("The cookbook file is malformed ({}): {}", location, message)
            }
            Self::EncodingError { location, message } => format!(
                "The cookbook contains text that cannot be stored ({}): {}",
                location, message
            ),
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                format!("Invalid configuration: {}", self)
            }
            Self::DuplicateRecipe { name } => format!("A recipe named '{}' already exists", name),
            Self::InvalidDomainValue { .. } => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the path exists and is readable/writable",
            ErrorCategory::Format => "Fix the reported record or restore the file from a backup",
            ErrorCategory::Encoding => {
                "Remove separators or line breaks from the reported field, or use the structured format"
            }
            ErrorCategory::Config => "Check the configuration file and command line arguments",
            ErrorCategory::Domain => "Rename or edit the recipe before saving",
        }
    }
}

pub type Result<T> = std::result::Result<T, CookbookError>;
