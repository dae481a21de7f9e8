//! Import orchestrator service
//!
//! Wires one importer and one source adapter together for a run: resolves
//! both by name, resolves the input directory, discovers and optionally
//! narrows the files, then hands them to the adapter.

use crate::adapters::{ContentAdapter, SpreadsheetAdapter};
use crate::discovery::WalkDirDiscovery;
use crate::importers::{ImportSettings, PostImporter, TermImporter, UserImporter};
use crate::metadata::strategy_for;
use folio_core::ImportConfig;
use folio_import_types::{
    DiscoveredFile, FileDiscovery, FileSelector, ImportError, ImportLog, ImportResult,
    ImportSource, ImportType, Importer, SourceAdapter,
};
use folio_records::ResolutionContext;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Builds a source adapter around the importer chosen for a run
pub type AdapterFactory = Arc<dyn Fn(Arc<dyn Importer>) -> Arc<dyn SourceAdapter> + Send + Sync>;

/// Parameters of one import run
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub import_type: ImportType,
    pub source: ImportSource,
    /// Input directory; falls back to the configured source directory
    pub path: Option<PathBuf>,
    /// File name filter, glob or `/regex/`
    pub pattern: Option<String>,
}

impl ImportRequest {
    pub fn new(import_type: ImportType, source: ImportSource) -> Self {
        Self {
            import_type,
            source,
            path: None,
            pattern: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// Outcome of a run
#[derive(Debug)]
pub struct ImportReport {
    pub log: ImportLog,
    /// Files handed to the adapter, after selection
    pub files: Vec<DiscoveredFile>,
    pub duration: Duration,
}

/// Import orchestrator coordinating importers, adapters and discovery
pub struct ImportOrchestrator {
    importers: HashMap<ImportType, Arc<dyn Importer>>,
    adapters: HashMap<ImportSource, AdapterFactory>,
    sources: BTreeMap<String, PathBuf>,
    discovery: Arc<dyn FileDiscovery>,
}

impl ImportOrchestrator {
    /// Create an orchestrator with no importers or adapters registered
    pub fn new(discovery: Arc<dyn FileDiscovery>, sources: BTreeMap<String, PathBuf>) -> Self {
        Self {
            importers: HashMap::new(),
            adapters: HashMap::new(),
            sources,
            discovery,
        }
    }

    /// Orchestrator with the post, term and user importers and the
    /// spreadsheet and content adapters, sharing `ctx`
    pub fn with_defaults(ctx: ResolutionContext, config: &ImportConfig) -> Self {
        let strategy = strategy_for(config.seo_provider);
        let settings = ImportSettings::from(config);

        let mut orchestrator =
            Self::new(Arc::new(WalkDirDiscovery::new()), config.sources.clone());

        orchestrator.register_importer(Arc::new(PostImporter::new(
            ctx.clone(),
            settings,
            strategy.clone(),
        )));
        orchestrator.register_importer(Arc::new(TermImporter::new(ctx.clone(), strategy.clone())));
        orchestrator.register_importer(Arc::new(UserImporter::new(ctx, strategy)));

        orchestrator.register_adapter(
            ImportSource::Spreadsheet,
            Arc::new(|importer: Arc<dyn Importer>| {
                Arc::new(SpreadsheetAdapter::new(importer)) as Arc<dyn SourceAdapter>
            }),
        );
        orchestrator.register_adapter(
            ImportSource::Content,
            Arc::new(|importer: Arc<dyn Importer>| {
                Arc::new(ContentAdapter::new(importer)) as Arc<dyn SourceAdapter>
            }),
        );

        orchestrator
    }

    /// Register an importer under its import type
    pub fn register_importer(&mut self, importer: Arc<dyn Importer>) {
        let import_type = importer.import_type();
        debug!("Registering importer for type: {}", import_type);
        self.importers.insert(import_type, importer);
    }

    /// Register an adapter factory for a source
    pub fn register_adapter(&mut self, source: ImportSource, factory: AdapterFactory) {
        debug!("Registering adapter for source: {}", source);
        self.adapters.insert(source, factory);
    }

    pub fn resolve_importer(&self, import_type: ImportType) -> ImportResult<Arc<dyn Importer>> {
        self.importers
            .get(&import_type)
            .cloned()
            .ok_or_else(|| ImportError::UnsupportedType(import_type.to_string()))
    }

    pub fn resolve_adapter(
        &self,
        source: ImportSource,
        importer: Arc<dyn Importer>,
    ) -> ImportResult<Arc<dyn SourceAdapter>> {
        self.adapters
            .get(&source)
            .map(|factory| factory(importer))
            .ok_or_else(|| ImportError::UnsupportedSource(source.to_string()))
    }

    /// Input directory: the override if given, else the configured directory
    /// for the source. Must exist and be a directory.
    pub fn resolve_path(
        &self,
        source: ImportSource,
        path_override: Option<&Path>,
    ) -> ImportResult<PathBuf> {
        let path = match path_override {
            Some(path) => path.to_path_buf(),
            None => self.sources.get(source.as_str()).cloned().ok_or_else(|| {
                ImportError::InvalidPath(format!(
                    "no path given and no directory configured for source {}",
                    source
                ))
            })?,
        };

        if !path.is_dir() {
            return Err(ImportError::InvalidPath(format!(
                "{} does not exist or is not a directory",
                path.display()
            )));
        }
        Ok(path)
    }

    /// Run one import
    ///
    /// Configuration errors (unknown type or source, bad path, no files)
    /// fail before any row is read. Row and file failures are recorded on
    /// the returned log.
    pub async fn run(
        &self,
        request: &ImportRequest,
        selector: Option<&dyn FileSelector>,
    ) -> ImportResult<ImportReport> {
        let started = Instant::now();

        let importer = self.resolve_importer(request.import_type)?;
        let adapter = self.resolve_adapter(request.source, importer)?;
        let root = self.resolve_path(request.source, request.path.as_deref())?;
        let extensions = adapter.supported_extensions();

        let files = self
            .discovery
            .discover(&root, extensions, request.pattern.as_deref())?;
        if files.is_empty() {
            return Err(ImportError::NoFiles {
                extensions: extensions.join(", "),
            });
        }
        info!("Found {} files in {}", files.len(), root.display());

        let files = match selector {
            Some(selector) => selector.select(files)?,
            None => files,
        };
        if files.is_empty() {
            info!("No files selected");
            return Ok(ImportReport {
                log: ImportLog::new(),
                files,
                duration: started.elapsed(),
            });
        }

        let log = adapter.import(&files).await?;
        let duration = started.elapsed();

        info!(
            "Imported {} rows from {} files in {:.2?}",
            log.total_entries(),
            files.len(),
            duration
        );

        Ok(ImportReport {
            log,
            files,
            duration,
        })
    }
}
