//! CLI route: single dispatch table from parsed commands to registry operations.

use crate::cli::help::{command_name, requires_registry};
use crate::cli::parse::{Commands, ThemeCommands};
use crate::cli::presentation::{
    default_tag, filter_repositories, format_batch_report_text, format_broadcast_json,
    format_broadcast_text, format_inspect_json, format_inspect_text, format_repositories_json,
    format_repositories_text, format_tags_json, format_tags_text, repository_rows, InspectView,
};
use crate::cli::surface::TerminalSurface;
use crate::config::{ConfigLoader, DruiConfig, ValidationError};
use crate::error::{DruiError, RegistryError};
use crate::flow::{BatchReport, DeleteTagsFlow};
use crate::modal::{DialogBody, DialogSurface, Key, ModalController};
use crate::registry::{image_mark, RegistryClient};
use crate::selection::TagTable;
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::theme::{Theme, ThemeManager};
use crate::transport::{RegistryTransport, Transport};
use dialoguer::{Confirm, MultiSelect};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const BROADCAST_NOT_FOUND: &str = "Broadcast file not found.";
pub const DELETE_CANCELLED: &str = "Deletion cancelled.";

/// CLI context for one invocation
pub struct RunContext {
    config: DruiConfig,
    modal: ModalController,
    theme: Mutex<ThemeManager>,
}

fn config_error(errors: Vec<ValidationError>) -> DruiError {
    DruiError::Config(
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    )
}

fn settings_store() -> Arc<dyn KeyValueStore> {
    match FileStore::default_path().map(|path| FileStore::open(path)) {
        Some(Ok(store)) => Arc::new(store),
        Some(Err(e)) => {
            warn!(error = %e, "Settings store unavailable, theme changes will not persist");
            Arc::new(MemoryStore::new())
        }
        None => Arc::new(MemoryStore::new()),
    }
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, DruiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };

        let theme = match ThemeManager::new(settings_store()) {
            Ok(theme) => theme,
            Err(e) => {
                warn!(error = %e, "Failed to persist theme, using in-memory settings");
                ThemeManager::new(Arc::new(MemoryStore::new()))?
            }
        };
        let surface = Arc::new(TerminalSurface::new(theme.current()));
        Self::with_parts(config, theme, surface)
    }

    /// Context over explicit parts; the configuration is validated here.
    pub fn with_parts(
        config: DruiConfig,
        theme: ThemeManager,
        surface: Arc<dyn DialogSurface>,
    ) -> Result<Self, DruiError> {
        config.validate(false).map_err(config_error)?;
        Ok(Self {
            config,
            modal: ModalController::new(surface),
            theme: Mutex::new(theme),
        })
    }

    pub fn config(&self) -> &DruiConfig {
        &self.config
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    pub fn theme(&self) -> Theme {
        self.theme.lock().current()
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, DruiError> {
        let name = command_name(command);
        let started = Instant::now();
        debug!(command = %name, "Executing command");

        let result = self.dispatch(command).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(command = %name, duration_ms, "Command completed"),
            Err(e) => warn!(command = %name, duration_ms, error = %e, "Command failed"),
        }
        result
    }

    async fn dispatch(&self, command: &Commands) -> Result<String, DruiError> {
        if requires_registry(command) {
            self.config.validate(true).map_err(config_error)?;
        }
        match command {
            Commands::Repositories {
                filter,
                repository,
                limit,
                format,
            } => {
                self.handle_repositories(filter.as_deref(), repository.as_deref(), *limit, format)
                    .await
            }
            Commands::Tags { image, format } => self.handle_tags(image, format).await,
            Commands::Inspect {
                image,
                tag,
                digest,
                format,
            } => {
                self.handle_inspect(image, tag.as_deref(), digest.as_deref(), format)
                    .await
            }
            Commands::Delete {
                image,
                tags,
                concurrency,
                yes,
            } => self.handle_delete(image, tags, *concurrency, *yes).await,
            Commands::Login => self.handle_login().await,
            Commands::Theme { command } => self.handle_theme(command.as_ref()),
            Commands::Broadcast { format } => self.handle_broadcast(format),
        }
    }

    fn registry(&self) -> Result<RegistryClient, DruiError> {
        Ok(RegistryClient::new(&self.config.registry)?)
    }

    async fn handle_repositories(
        &self,
        filter: Option<&str>,
        repository: Option<&str>,
        limit: Option<usize>,
        format: &str,
    ) -> Result<String, DruiError> {
        let names = self.registry()?.repositories().await?;
        let names = filter_repositories(names, repository, filter)?;
        let rows = repository_rows(&names, &self.config.ui);
        let limit = limit.unwrap_or(self.config.ui.images_per_page);
        match format {
            "json" => format_repositories_json(&rows, limit),
            _ => Ok(format_repositories_text(&rows, limit, self.theme())),
        }
    }

    async fn handle_tags(&self, image: &str, format: &str) -> Result<String, DruiError> {
        let tags = self
            .registry()?
            .tags(image)
            .await?
            .ok_or_else(|| RegistryError::NotFound(image.to_string()))?;
        match format {
            "json" => format_tags_json(image, &tags),
            _ => Ok(format_tags_text(image, &tags, self.theme())),
        }
    }

    async fn handle_inspect(
        &self,
        image: &str,
        tag: Option<&str>,
        digest: Option<&str>,
        format: &str,
    ) -> Result<String, DruiError> {
        let registry = self.registry()?;
        let tags = registry.tags(image).await?.unwrap_or_default();
        let tag = match tag.or_else(|| default_tag(&tags)) {
            Some(tag) => tag.to_string(),
            None => return Ok(format!("No tags found for {}.", image)),
        };
        let manifest = registry
            .manifest(image, &tag, digest)
            .await?
            .ok_or_else(|| RegistryError::NotFound(format!("{}:{}", image, tag)))?;

        let view = InspectView {
            image,
            tag: &tag,
            manifest: &manifest,
            tags: &tags,
            pull_endpoint: self.config.registry.pull_endpoint(),
            mark: image_mark(image, &self.config.ui.official_prefix, &self.config.ui.verified_prefix),
        };
        match format {
            "json" => format_inspect_json(&view),
            _ => Ok(format_inspect_text(&view, self.theme())),
        }
    }

    async fn handle_login(&self) -> Result<String, DruiError> {
        let registry = self.registry()?;
        registry.login().await?;
        Ok(format!("Login succeeded for {}.", registry.endpoint()))
    }

    fn handle_theme(&self, command: Option<&ThemeCommands>) -> Result<String, DruiError> {
        let mut manager = self.theme.lock();
        match command {
            None | Some(ThemeCommands::Show) => Ok(format!("Theme: {}", manager.current())),
            Some(ThemeCommands::Toggle) => {
                let theme = manager.toggle_theme()?;
                Ok(format!("Theme switched to {}.", theme))
            }
            Some(ThemeCommands::Set { theme }) => {
                let theme: Theme = theme.parse().map_err(DruiError::Input)?;
                manager.set_theme(theme)?;
                Ok(format!("Theme set to {}.", theme))
            }
        }
    }

    fn handle_broadcast(&self, format: &str) -> Result<String, DruiError> {
        let content = match self.config.broadcast.path.as_deref() {
            Some(path) if path.is_file() => std::fs::read_to_string(path)?,
            _ => return Ok(BROADCAST_NOT_FOUND.to_string()),
        };
        match format {
            "json" => format_broadcast_json(&content),
            _ => Ok(format_broadcast_text(&content, self.theme())),
        }
    }

    async fn handle_delete(
        &self,
        image: &str,
        preselected: &[String],
        concurrency: Option<usize>,
        assume_yes: bool,
    ) -> Result<String, DruiError> {
        if self.config.ui.disable_delete {
            return Err(DruiError::DeleteDisabled);
        }
        let registry = self.registry()?;
        let tags = registry.tags(image).await?.unwrap_or_default();
        if tags.is_empty() {
            return Ok(format!("No tags found for {}.", image));
        }

        let table = Arc::new(Mutex::new(TagTable::new(tags)));
        let unknown = table.lock().select(preselected);
        if !unknown.is_empty() {
            return Err(DruiError::Input(format!(
                "Unknown tags for {}: {}",
                image,
                unknown.join(", ")
            )));
        }

        let transport: Arc<dyn Transport> =
            Arc::new(RegistryTransport::new(registry, self.config.ui.disable_delete));
        let concurrency = concurrency.unwrap_or(self.config.ui.delete_concurrency);
        let flow = DeleteTagsFlow::new(image, transport, concurrency, Arc::clone(&table));

        let rendered = table.lock().render();
        let body = DialogBody::text(format!("Select image {} tags to delete:\n{}", image, rendered))
            .with_control("deleted_tags", true);
        flow.open(&self.modal, body);

        let result = if assume_yes {
            self.delete_unattended(&flow).await
        } else {
            self.delete_interactive(&flow, &table).await
        };
        self.modal.force_close();
        result
    }

    async fn delete_unattended(&self, flow: &DeleteTagsFlow<TagTable>) -> Result<String, DruiError> {
        self.modal.confirm();
        match flow.finish().await {
            Some(report) => batch_result(report),
            None => Err(DruiError::Input(
                self.modal
                    .error()
                    .unwrap_or_else(|| DELETE_CANCELLED.to_string()),
            )),
        }
    }

    async fn delete_interactive(
        &self,
        flow: &DeleteTagsFlow<TagTable>,
        table: &Mutex<TagTable>,
    ) -> Result<String, DruiError> {
        while self.modal.is_open() {
            if !pick_tags(&self.modal, table)? {
                continue;
            }
            let count = table.lock().selected_indices().len();
            let prompt = format!("{} {} tag(s) of {}?", self.modal.accept_label(), count, flow.image());
            let answer = Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact_opt()
                .map_err(|e| DruiError::Input(e.to_string()))?;
            match answer {
                Some(true) => {
                    self.modal.confirm();
                }
                Some(false) => {
                    self.modal.cancel();
                    continue;
                }
                None => {
                    self.modal.handle_key(Key::Escape);
                    continue;
                }
            }
            if let Some(report) = flow.finish().await {
                return batch_result(report);
            }
        }
        Ok(DELETE_CANCELLED.to_string())
    }
}

/// Let the user toggle tags. `false` when the prompt was dismissed with Escape.
fn pick_tags(modal: &ModalController, table: &Mutex<TagTable>) -> Result<bool, DruiError> {
    let (rows, checked) = {
        let table = table.lock();
        (table.rows().to_vec(), table.checked())
    };
    let picked = MultiSelect::new()
        .with_prompt("Tags to delete (space toggles, enter accepts, esc closes)")
        .items(&rows)
        .defaults(&checked)
        .interact_opt()
        .map_err(|e| DruiError::Input(e.to_string()))?;
    match picked {
        Some(indices) => {
            table.lock().set_selected_indices(&indices);
            Ok(true)
        }
        None => {
            modal.handle_key(Key::Escape);
            Ok(false)
        }
    }
}

fn batch_result(report: BatchReport) -> Result<String, DruiError> {
    if report.is_success() {
        Ok(format_batch_report_text(&report))
    } else {
        Err(DruiError::BatchFailed {
            failed: report.failed.len(),
            total: report.total(),
            details: report.failure_lines().join("\n"),
        })
    }
}
