pub mod config;
pub mod count;
pub mod host;
pub mod orchestrator;
pub mod payload;
pub mod provider;
pub mod usage;

#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use studio_contracts::events::{EventLog, StudioEvent};
use studio_contracts::messages::{Locale, MessageKey};
use studio_contracts::presets::PresetCatalog;
use studio_contracts::references::{ReferenceImage, ReferenceManager, ReferenceSource};
use studio_contracts::results::{GeneratedResult, ResultSink};
use studio_contracts::settings::Settings;
use studio_contracts::store::{JsonFileStore, SharedStore};

pub use config::StudioConfig;
pub use count::ImageCount;
pub use host::{Clipboard, DocumentHost};
pub use orchestrator::GenerationError;
pub use provider::{GeminiClient, GenerationTransport};
pub use usage::{UsageStatus, UsageSummary};

use orchestrator::{run_batch, BatchPlan};
use provider::error_chain_text;

/// The panel's application state and the only owner of it.
///
/// All operations take `&mut self`, so a batch can never start while another
/// one is still running on the same `Studio`.
pub struct Studio {
    config: StudioConfig,
    settings: Settings,
    references: ReferenceManager,
    results: ResultSink,
    presets: PresetCatalog,
    usage: Option<UsageStatus>,
    transport: Box<dyn GenerationTransport>,
    events: Option<EventLog>,
}

impl Studio {
    /// Production wiring: JSON file storage under the data dir, the Gemini
    /// client, and the event log when configured.
    pub fn open(config: StudioConfig) -> Self {
        let store: SharedStore = Arc::new(JsonFileStore::new(config.storage_path()));
        let transport = Box::new(GeminiClient::new(&config));
        let events = config.events_path.clone().map(EventLog::open);
        let mut studio = Self::with_parts(config, store, transport);
        studio.events = events;
        studio
    }

    pub fn with_parts(
        config: StudioConfig,
        store: SharedStore,
        transport: Box<dyn GenerationTransport>,
    ) -> Self {
        let references = ReferenceManager::load(store.clone());
        log::debug!("loaded {} stored references", references.len());
        Self {
            config,
            settings: Settings::new(store),
            references,
            results: ResultSink::new(),
            presets: PresetCatalog::builtin(),
            usage: None,
            transport,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn references(&self) -> &[ReferenceImage] {
        self.references.list()
    }

    pub fn results(&self) -> &[GeneratedResult] {
        self.results.current()
    }

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    pub fn locale(&self) -> Locale {
        self.settings.locale()
    }

    /// Last usage lookup, if any has run this session.
    pub fn usage(&self) -> Option<&UsageStatus> {
        self.usage.as_ref()
    }

    pub fn set_prompt(&mut self, prompt: &str) -> Result<()> {
        self.settings.set_prompt(prompt)
    }

    pub fn set_locale(&mut self, locale: Locale) -> Result<()> {
        self.settings.set_locale(locale)
    }

    /// Saves the credential and refreshes usage with it.
    pub fn set_credential(&mut self, credential: &str) -> Result<UsageStatus> {
        self.settings.set_credential(credential)?;
        Ok(self.refresh_usage(None))
    }

    /// Explicit override, then the stored credential, then the configured fallback.
    pub fn resolve_credential(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| self.settings.credential())
            .or_else(|| {
                self.config
                    .fallback_credential
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            })
    }

    /// Sets and persists the preset prompt; returns its image count.
    pub fn apply_preset(&mut self, id: &str) -> Result<Option<ImageCount>> {
        let Some(preset) = self.presets.find(id) else {
            return Ok(None);
        };
        let (prompt, count) = (preset.prompt, preset.count);
        self.settings.set_prompt(prompt)?;
        Ok(Some(ImageCount::from(count)))
    }

    pub fn add_dropped(&mut self, image: &[u8]) -> Result<Option<ReferenceImage>> {
        self.add_reference(image, ReferenceSource::Drop)
    }

    pub fn capture_document(
        &mut self,
        host: &mut dyn DocumentHost,
    ) -> Result<Option<ReferenceImage>> {
        match host.export_document()? {
            Some(image) => self.add_reference(&image, ReferenceSource::Document),
            None => Ok(None),
        }
    }

    pub fn capture_layer(&mut self, host: &mut dyn DocumentHost) -> Result<Option<ReferenceImage>> {
        match host.export_active_layer()? {
            Some(image) => self.add_reference(&image, ReferenceSource::Layer),
            None => Ok(None),
        }
    }

    pub fn add_reference(
        &mut self,
        image: &[u8],
        source: ReferenceSource,
    ) -> Result<Option<ReferenceImage>> {
        let added = self.references.add(image, source)?;
        if let Some(reference) = &added {
            self.emit(StudioEvent::ReferenceAdded {
                reference_id: reference.id.clone(),
                source,
                count: self.references.len(),
            });
        }
        Ok(added)
    }

    pub fn remove_reference(&mut self, id: &str) -> Result<bool> {
        let removed = self.references.remove(id)?;
        if removed {
            self.emit(StudioEvent::ReferenceRemoved {
                reference_id: id.to_string(),
                count: self.references.len(),
            });
        }
        Ok(removed)
    }

    pub fn clear_references(&mut self) -> Result<()> {
        let removed = self.references.clear()?;
        self.emit(StudioEvent::ReferencesCleared { removed });
        Ok(())
    }

    /// Runs one batch with the stored prompt and current references. On success
    /// the result sink is replaced; on any error it is left untouched and the
    /// cause is logged.
    pub fn generate(
        &mut self,
        credential: Option<&str>,
        count: ImageCount,
    ) -> Result<&[GeneratedResult], GenerationError> {
        let credential = self.resolve_credential(credential).unwrap_or_default();
        let prompt = self.settings.prompt();
        let plan = match BatchPlan::new(&credential, &prompt, self.references.list(), count) {
            Ok(plan) => plan,
            Err(err) => {
                log::warn!("generation rejected: {err}");
                return Err(err);
            }
        };

        log::info!(
            "starting batch: {} calls over {} payloads",
            plan.requested().get(),
            plan.payloads().len()
        );
        self.emit(StudioEvent::BatchStarted {
            requested: plan.requested().get(),
            payloads: plan.payloads().len(),
            references: self.references.len(),
        });

        let events = self.events.as_ref();
        let outcome = run_batch(self.transport.as_ref(), &plan, |step| {
            log::debug!(
                "call {} used payload {} and returned {} images",
                step.index + 1,
                step.payload_index,
                step.images.len()
            );
            record_event(
                events,
                StudioEvent::CallCompleted {
                    index: step.index,
                    payload_index: step.payload_index,
                    images: step.images.len(),
                },
            );
        });

        match outcome {
            Ok(results) => {
                log::info!("batch finished with {} images", results.len());
                self.emit(StudioEvent::BatchCompleted {
                    results: results.len(),
                });
                self.results.replace(results);
                Ok(self.results.current())
            }
            Err(err) => {
                let detail = match &err {
                    GenerationError::GenerationFailed(cause) => error_chain_text(cause, 1024),
                    other => other.to_string(),
                };
                log::error!("generation batch failed: {detail}");
                self.emit(StudioEvent::BatchFailed { error: detail });
                Err(err)
            }
        }
    }

    /// Localized, generic notice for a failed `generate` call.
    pub fn notice_for(&self, err: &GenerationError) -> &'static str {
        let key = match err {
            GenerationError::CredentialMissing => MessageKey::CredentialMissing,
            GenerationError::PromptRequired => MessageKey::PromptRequired,
            GenerationError::GenerationFailed(_) => MessageKey::ErrorGeneral,
        };
        self.locale().text(key)
    }

    pub fn refresh_usage(&mut self, credential: Option<&str>) -> UsageStatus {
        let credential = self.resolve_credential(credential).unwrap_or_default();
        let status = usage::fetch_usage(self.transport.as_ref(), &credential);
        self.emit(StudioEvent::UsageFetched {
            available: status.is_available(),
        });
        self.usage = Some(status.clone());
        status
    }

    /// Copies the result's base64 text; `false` when the id is unknown.
    pub fn copy_result(&self, id: &str, clipboard: &mut dyn Clipboard) -> Result<bool> {
        let Some(result) = self.results.get(id) else {
            return Ok(false);
        };
        clipboard.copy_text(&result.data)?;
        Ok(true)
    }

    pub fn place_result(&self, id: &str, host: &mut dyn DocumentHost) -> Result<bool> {
        let Some(result) = self.results.get(id) else {
            return Ok(false);
        };
        host.place_image(&host::decode_image(&result.data)?)?;
        Ok(true)
    }

    pub fn save_result(&self, id: &str, dir: &Path) -> Result<Option<PathBuf>> {
        self.results
            .get(id)
            .map(|result| host::save_result(dir, result))
            .transpose()
    }

    /// Exports the active layer straight to the clipboard as base64 text.
    pub fn quick_layer_to_clipboard(
        &self,
        host: &mut dyn DocumentHost,
        clipboard: &mut dyn Clipboard,
    ) -> Result<bool> {
        let Some(image) = host.export_active_layer()? else {
            return Ok(false);
        };
        clipboard.copy_text(&host::encode_image(&image))?;
        Ok(true)
    }

    fn emit(&self, event: StudioEvent) {
        record_event(self.events.as_ref(), event);
    }
}

/// Event-log failures never interrupt the operation being logged.
fn record_event(events: Option<&EventLog>, event: StudioEvent) {
    let Some(events) = events else {
        return;
    };
    if let Err(err) = events.record(event) {
        log::warn!("event log write failed: {err:#}");
    }
}
