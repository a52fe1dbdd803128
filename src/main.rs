use anyhow::Context;
use clap::Parser;
use cookbook_store::config::toml_config::LogFormat;
use cookbook_store::utils::{logger, validation::Validate};
use cookbook_store::{
    CliConfig, CodecDriver, CookbookConfig, CookbookError, ErrorCategory, LocalStorage,
};

fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    let config = match &args.config {
        Some(path) => CookbookConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => CookbookConfig::default(),
    };

    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose, &config.logging.level),
        LogFormat::Json => logger::init_json_logger(args.verbose, &config.logging.level),
    }

    tracing::info!("Starting cookbook-convert");
    tracing::debug!("CLI config: {:?}", args);

    if let Err(e) = config.validate().and_then(|_| args.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.storage.base_path.clone());
    let driver = CodecDriver::with_codecs(
        storage,
        config.structured_codec(),
        config.delimited_codec(),
    );

    if let Err(e) = run(&driver, &args) {
        tracing::error!(
            "❌ Conversion failed: {} (Category: {:?})",
            e,
            e.category()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.category() {
            ErrorCategory::Config | ErrorCategory::Domain => 1,
            ErrorCategory::Format | ErrorCategory::Encoding => 2,
            ErrorCategory::Io => 3,
        };
        std::process::exit(exit_code);
    }

    println!("✅ Wrote {}", args.output);
    Ok(())
}

fn run(driver: &CodecDriver<LocalStorage>, args: &CliConfig) -> Result<(), CookbookError> {
    let cookbook = driver.load_cookbook(&args.input, args.input_format()?)?;
    let output_format = args.output_format()?;

    match &args.recipe {
        Some(name) => {
            let recipe = cookbook
                .recipe(name)
                .ok_or_else(|| CookbookError::InvalidConfigValueError {
                    field: "recipe".to_string(),
                    value: name.clone(),
                    reason: format!("no such recipe in cookbook '{}'", cookbook.name()),
                })?;
            driver.save_recipe(&args.output, recipe, output_format)
        }
        None => driver.save_cookbook(&args.output, &cookbook, output_format),
    }
}
