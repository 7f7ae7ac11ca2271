use crate::cli::config::{AppConfig, SettingsArgs, apply_settings_args, load_config, save_config};
use crate::dom::loader::load_page;
use crate::dom::serialize::to_html;
use crate::fill::settings::FillSettings;
use crate::fill::trigger::{FillResponse, FormFiller};
use crate::form::extractor::extract_fields;
use crate::trace::logger::TraceLogger;

// ============================================================================
// fields subcommand
// ============================================================================

/// Print the page's field descriptors as pretty JSON.
pub async fn cmd_fields(page: &str) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_page(page).await?;
    let fields = extract_fields(&doc);

    if fields.is_empty() {
        eprintln!("No form fields found on the page");
    }

    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

// ============================================================================
// fill subcommand
// ============================================================================

/// Fill the page, optionally write the filled HTML, print the response.
pub async fn cmd_fill(
    page: &str,
    output: Option<&str>,
    settings: &FillSettings,
    trace_path: &str,
) -> Result<FillResponse, Box<dyn std::error::Error>> {
    let mut doc = load_page(page).await?;
    let filler = FormFiller::with_tracer(build_tracer(trace_path));

    let response = filler.trigger(&mut doc, settings).await;

    if response.success {
        if let Some(path) = output {
            tokio::fs::write(path, to_html(&doc)).await?;
            tracing::info!(path, "wrote filled page");
        }
    }

    println!("{}", serde_json::to_string(&response)?);
    Ok(response)
}

// ============================================================================
// configure subcommand
// ============================================================================

/// Merge the given flags into the config file and save it.
pub fn cmd_configure(
    config_path: Option<&str>,
    args: &SettingsArgs,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = load_config(config_path);
    apply_settings_args(&mut config, args);
    save_config(config_path, &config)?;

    let settings = &config.settings;
    println!(
        "Saved settings: enabled={}, provider={}, model={}, api key {}",
        settings.enabled,
        settings.provider().unwrap_or("(none)"),
        settings.model().unwrap_or("(none)"),
        if settings.api_key().is_some() { "set" } else { "not set" }
    );
    Ok(config)
}

// ============================================================================
// Helpers
// ============================================================================

/// Trace logger for `path`; an empty path disables tracing.
pub fn build_tracer(path: &str) -> TraceLogger {
    if path.trim().is_empty() {
        TraceLogger::disabled()
    } else {
        TraceLogger::new(path)
    }
}
