use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dom::node::Document;
use crate::fill::error::FillError;
use crate::fill::settings::FillSettings;
use crate::form::extractor::extract_fields;
use crate::form::fingerprint::selection_fingerprint;
use crate::form::writer::apply_values;
use crate::generation::generator::ValueGenerator;
use crate::generation::provider::build_generator;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{FillStage, FillTraceEvent};

// ============================================================================
// Trigger result
// ============================================================================

/// What the trigger hands back: `{"success":true}` or
/// `{"success":false,"error":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FillResponse {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: &FillError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

impl<T> From<&Result<T, FillError>> for FillResponse {
    fn from(result: &Result<T, FillError>) -> Self {
        match result {
            Ok(_) => FillResponse::ok(),
            Err(e) => FillResponse::failed(e),
        }
    }
}

/// Summary of a completed fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub fields: usize,
    pub values: usize,
    pub applied: usize,
    pub skipped: Vec<String>,
}

// ============================================================================
// Orchestration
// ============================================================================

/// Runs the fill pipeline and records each stage in a trace log.
pub struct FormFiller {
    tracer: TraceLogger,
    runs: AtomicU64,
}

impl Default for FormFiller {
    fn default() -> Self {
        Self::with_tracer(TraceLogger::disabled())
    }
}

impl FormFiller {
    pub fn with_tracer(tracer: TraceLogger) -> Self {
        Self {
            tracer,
            runs: AtomicU64::new(0),
        }
    }

    /// The trigger: enabled check, configuration check, then the pipeline.
    ///
    /// Every path ends in exactly one [`FillResponse`]. When disabled, the
    /// document is not queried at all.
    pub async fn trigger(&self, doc: &mut Document, settings: &FillSettings) -> FillResponse {
        let run = self.runs.fetch_add(1, Ordering::Relaxed);
        let mut event = FillTraceEvent::now(run, FillStage::Triggered);
        if let Some(provider) = settings.provider() {
            event = event.with_provider(provider);
        }
        self.tracer.log(&event);

        let result = self.run_trigger(run, doc, settings).await;
        match &result {
            Ok(report) => info!(
                fields = report.fields,
                applied = report.applied,
                "form filled"
            ),
            Err(e) => {
                warn!(error = %e, "form fill failed");
                self.tracer
                    .log(&FillTraceEvent::now(run, FillStage::Failed).with_error(e));
            }
        }
        FillResponse::from(&result)
    }

    /// Extract, generate, write back. Configuration is the caller's problem.
    pub async fn fill_with(
        &self,
        doc: &mut Document,
        generator: &dyn ValueGenerator,
    ) -> Result<FillReport, FillError> {
        let run = self.runs.fetch_add(1, Ordering::Relaxed);
        let result = self.run_pipeline(run, doc, generator).await;
        if let Err(e) = &result {
            self.tracer
                .log(&FillTraceEvent::now(run, FillStage::Failed).with_error(e));
        }
        result
    }

    async fn run_trigger(
        &self,
        run: u64,
        doc: &mut Document,
        settings: &FillSettings,
    ) -> Result<FillReport, FillError> {
        if !settings.enabled {
            return Err(FillError::Disabled);
        }
        let generator = build_generator(settings)?;
        self.run_pipeline(run, doc, generator.as_ref()).await
    }

    async fn run_pipeline(
        &self,
        run: u64,
        doc: &mut Document,
        generator: &dyn ValueGenerator,
    ) -> Result<FillReport, FillError> {
        let fields = extract_fields(doc);
        if fields.is_empty() {
            return Err(FillError::NoFillableFields);
        }

        let fingerprint = selection_fingerprint(doc);
        self.tracer.log(
            &FillTraceEvent::now(run, FillStage::Extracted)
                .with_fields(fields.len())
                .with_fingerprint(&fingerprint),
        );

        debug!(provider = generator.provider(), fields = fields.len(), "generating values");
        let values = generator.generate(&fields).await?;
        self.tracer.log(
            &FillTraceEvent::now(run, FillStage::Generated)
                .with_provider(generator.provider())
                .with_values(values.len()),
        );

        let written = apply_values(doc, &values);
        self.tracer.log(
            &FillTraceEvent::now(run, FillStage::Applied)
                .with_applied(written.applied.len(), &written.skipped)
                .with_fingerprint(&fingerprint),
        );

        Ok(FillReport {
            fields: fields.len(),
            values: values.len(),
            applied: written.applied.len(),
            skipped: written.skipped,
        })
    }
}

/// Trigger a fill with no trace log.
pub async fn trigger_fill(doc: &mut Document, settings: &FillSettings) -> FillResponse {
    FormFiller::default().trigger(doc, settings).await
}

/// Run the pipeline against an already-built generator, with no trace log.
pub async fn fill_with(
    doc: &mut Document,
    generator: &dyn ValueGenerator,
) -> Result<FillReport, FillError> {
    FormFiller::default().fill_with(doc, generator).await
}
