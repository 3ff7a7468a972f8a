mod config;

use std::env;
use std::fs;
use std::process;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use getopts::Options;

use guardrail_core::helpers::summary::summarize;
use guardrail_core::moderation::catalog::ProviderCatalog;
use guardrail_core::moderation::dto::{ModerationConfig, PersistableConfig};
use guardrail_core::moderation::editor::ModerationEditor;
use guardrail_core::moderation::error::EditorError;
use guardrail_core::moderation::runtime::ModerationService;
use guardrail_core::moderation::storage::ModerationSettingsManager;

use crate::config::AppConfig;

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [OPTIONS]", program);
    print!("{}", opts.usage(&brief));
    println!("\nEnvironment variables:");
    println!("  ACCOUNT_SEED        Storage key suffix (required for --save and --test-outputs)");
    println!("  MODERATION_DB       sled database path (default: moderation_db)");
    println!("  MODERATION_LOCALE   Locale used for labels (default: en-US)");
    println!("  OPENAI_CONFIGURED   Whether hosted OpenAI moderation is available (default: true)");
}

fn load_catalog(path: Option<String>) -> Result<ProviderCatalog> {
    match path {
        Some(path) => {
            let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path))?;
            ProviderCatalog::from_response_json(&bytes)
                .with_context(|| format!("Invalid provider catalog in {}", path))
        }
        None => {
            log::warn!("No provider catalog given, only system providers are available");
            Ok(ProviderCatalog::pending())
        }
    }
}

fn load_editor(
    config_path: &str,
    catalog: ProviderCatalog,
    app_config: &AppConfig,
) -> Result<ModerationEditor> {
    let bytes = fs::read(config_path).with_context(|| format!("Failed to read {}", config_path))?;
    let initial: ModerationConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("Invalid moderation config in {}", config_path))?;
    Ok(ModerationEditor::new(initial, catalog).with_context(app_config.validation_context()))
}

fn open_settings(app_config: &AppConfig) -> Result<ModerationSettingsManager> {
    let account_seed = app_config.account_seed()?;
    let db = sled::open(&app_config.db_path)
        .with_context(|| format!("Failed to open sled DB at {}", app_config.db_path))?;
    Ok(ModerationSettingsManager::new(&db, account_seed)?)
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("c", "config", "Moderation config JSON file", "FILE");
    opts.optopt("p", "providers", "Provider catalog JSON file", "FILE");
    opts.optflag("v", "validate", "Validate and print the normalized config");
    opts.optopt("s", "save", "Validate and store the config for an app", "APP_ID");
    opts.optopt("t", "test-outputs", "Run an app's stored moderation over TEXT", "TEXT");
    opts.optopt("a", "app", "App id used with --test-outputs", "APP_ID");
    opts.optflag("h", "help", "Show this help message");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("Error parsing arguments: {}", f);
            print_usage(&program, opts);
            process::exit(1);
        }
    };

    if matches.opt_present("h") {
        print_usage(&program, opts);
        return Ok(());
    }

    let app_config = AppConfig::from_env()?;

    if let Some(text) = matches.opt_str("t") {
        let Some(app_id) = matches.opt_str("a") else {
            eprintln!("Error: --test-outputs needs --app");
            process::exit(1);
        };
        let service = ModerationService::new(open_settings(&app_config)?);
        let result = service.moderation_for_outputs(&app_id, &text)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let validate_flag = matches.opt_present("v");
    let save_app = matches.opt_str("s");

    if !validate_flag && save_app.is_none() {
        eprintln!("Error: Must specify --validate, --save or --test-outputs");
        print_usage(&program, opts);
        process::exit(1);
    }

    let Some(config_path) = matches.opt_str("c") else {
        eprintln!("Error: --config is required");
        process::exit(1);
    };

    let catalog = load_catalog(matches.opt_str("p"))?;
    let editor = load_editor(&config_path, catalog, &app_config)?;

    let saved = match save_app {
        Some(app_id) => {
            let settings = open_settings(&app_config)?;
            editor.save(&mut settings.sink(app_id))
        }
        None => editor.save(&mut |_: &PersistableConfig| -> Result<()> { Ok(()) }),
    };

    match saved {
        Ok(config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            println!("\n{}", summarize(&config, editor.catalog(), &app_config.locale));
            Ok(())
        }
        Err(EditorError::Validation(error)) => {
            eprintln!("{}", error);
            process::exit(1);
        }
        Err(error) => Err(error.into()),
    }
}
