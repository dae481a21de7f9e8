use crate::report::print_report;
use crate::selection::PromptSelector;
use clap::Args;
use folio_core::FolioConfig;
use folio_database::{apply_site_config, establish_connection, SeaOrmRepository};
use folio_import::{ImportOrchestrator, ImportRequest};
use folio_import_types::{FileSelector, ImportSource, ImportType};
use folio_records::ResolutionContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

fn parse_import_type(value: &str) -> Result<ImportType, String> {
    ImportType::from_str(value).map_err(|e| e.to_string())
}

fn parse_import_source(value: &str) -> Result<ImportSource, String> {
    ImportSource::from_str(value).map_err(|e| e.to_string())
}

#[derive(Args)]
pub struct ImportCommand {
    /// What to import: post, term or user
    #[arg(value_parser = parse_import_type)]
    pub import_type: ImportType,

    /// Source adapter: spreadsheet or content
    #[arg(long, default_value = "spreadsheet", value_parser = parse_import_source)]
    pub source: ImportSource,

    /// Input directory, defaults to the source directory from the config
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Only import files whose name matches this glob or /regex/
    #[arg(long = "file")]
    pub pattern: Option<String>,

    /// Choose the files to import from a list
    #[arg(long, short)]
    pub interactive: bool,

    /// Configuration file, defaults to ./folio.yaml when present
    #[arg(long, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database connection URL, overrides the config
    #[arg(long, env = "FOLIO_DATABASE_URL")]
    pub database_url: Option<String>,
}

impl ImportCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let mut config = FolioConfig::load_or_default(self.config.as_deref())?;
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }

        debug!("Initializing database connection...");
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run(config))
    }

    async fn run(self, config: FolioConfig) -> anyhow::Result<()> {
        let db = establish_connection(&config.database).await?;
        let repository = Arc::new(SeaOrmRepository::new(db));
        apply_site_config(&repository, &config.import).await?;

        let ctx = ResolutionContext::new(repository);
        let orchestrator = ImportOrchestrator::with_defaults(ctx, &config.import);

        let mut request = ImportRequest::new(self.import_type, self.source);
        if let Some(path) = self.path {
            request = request.with_path(path);
        }
        if let Some(pattern) = self.pattern {
            request = request.with_pattern(pattern);
        }

        info!(
            "Importing {} from {} files",
            request.import_type, request.source
        );

        let selector = PromptSelector;
        let selector: Option<&dyn FileSelector> = if self.interactive {
            Some(&selector)
        } else {
            None
        };

        let report = orchestrator.run(&request, selector).await?;
        print_report(&report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        import: ImportCommand,
    }

    #[test]
    fn test_parses_arguments() {
        let cli = TestCli::try_parse_from([
            "folio",
            "term",
            "--source",
            "content",
            "--path",
            "./data",
            "--file",
            "*.md",
            "-i",
        ])
        .unwrap();

        assert_eq!(cli.import.import_type, ImportType::Term);
        assert_eq!(cli.import.source, ImportSource::Content);
        assert_eq!(cli.import.path, Some(PathBuf::from("./data")));
        assert_eq!(cli.import.pattern.as_deref(), Some("*.md"));
        assert!(cli.import.interactive);
    }

    #[test]
    fn test_defaults_to_spreadsheet_source() {
        let cli = TestCli::try_parse_from(["folio", "user"]).unwrap();

        assert_eq!(cli.import.source, ImportSource::Spreadsheet);
        assert!(!cli.import.interactive);
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(TestCli::try_parse_from(["folio", "attachment"]).is_err());
    }
}
