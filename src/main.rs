mod cli;
mod config;

use bomgraph::adapters::outbound::console::{DiagnosticRenderer, StderrProgressReporter};
use bomgraph::adapters::outbound::filesystem::{
    FileSystemReader, FileSystemWriter, StdoutPresenter, WalkDirGlobber,
};
use bomgraph::adapters::outbound::formatters::JsonFormatter;
use bomgraph::application::analyzers::{
    Analyzer, CycloneDxAnalyzer, DotnetAnalyzer, NpmAnalyzer, PoetryAnalyzer,
};
use bomgraph::application::dto::AnalysisRequest;
use bomgraph::application::use_cases::AnalyzeProjectUseCase;
use bomgraph::ports::inbound::AnalysisPort;
use bomgraph::ports::outbound::{BomFormatter, OutputPresenter};
use bomgraph::shared::error::{ExitCode, SbomError};
use bomgraph::shared::Result;
use cli::Args;
use config::ConfigFile;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

const STDOUT_OUTPUT: &str = "-";

fn main() {
    let mut use_case = build_use_case();
    let (args, options) = Args::parse_with(&use_case.options());
    init_tracing(args.verbose);

    match run(&mut use_case, args, &options) {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }
            eprintln!();

            let code = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<SbomError>())
                .map(SbomError::exit_code)
                .unwrap_or(ExitCode::ApplicationError);
            process::exit(code.as_i32());
        }
    }
}

fn build_use_case() -> AnalyzeProjectUseCase<WalkDirGlobber, StderrProgressReporter> {
    let analyzers: Vec<Box<dyn Analyzer>> = vec![
        Box::new(DotnetAnalyzer::new(FileSystemReader::new())),
        Box::new(NpmAnalyzer::new(FileSystemReader::new())),
        Box::new(PoetryAnalyzer::new(FileSystemReader::new())),
        Box::new(CycloneDxAnalyzer::new(FileSystemReader::new())),
    ];
    AnalyzeProjectUseCase::new(WalkDirGlobber::new(), StderrProgressReporter::new(), analyzers)
}

/// Logs go to stderr; `RUST_LOG` wins over the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(
    port: &mut dyn AnalysisPort,
    args: Args,
    options: &cli::CliOptions,
) -> Result<ExitCode> {
    let config = load_config(&args)?;
    if let Some(config) = &config {
        for key in config.unknown_keys() {
            eprintln!("⚠️  Warning: Unknown config field '{}' will be ignored.", key);
        }
    }

    let output = args.output.clone();
    let request = build_request(args, config);
    let response = port.analyze(request, options)?;

    DiagnosticRenderer::new().print(&response.diagnostics);

    if response.has_errors() {
        eprintln!("❌ Analysis reported errors; no BOM was written.");
        return Ok(ExitCode::AnalysisErrors);
    }
    if response.bom.components.is_empty() {
        eprintln!("⚠️  No components were found; no BOM was written.");
        return Ok(ExitCode::EmptyBom);
    }

    let formatted = JsonFormatter::new().format(&response.bom)?;
    let presenter: Box<dyn OutputPresenter> = match output.as_deref() {
        Some(STDOUT_OUTPUT) => Box::new(StdoutPresenter::new()),
        Some(path) => Box::new(FileSystemWriter::new(PathBuf::from(path))),
        None => Box::new(FileSystemWriter::new(default_output_path(
            &response.root,
            &response.bom.name,
        ))),
    };
    presenter.present(&formatted)?;

    Ok(ExitCode::Success)
}

/// `--config` when given, else `bomgraph.config.yml` beside the input.
fn load_config(args: &Args) -> Result<Option<ConfigFile>> {
    if let Some(path) = &args.config {
        return config::load_config_from_path(path).map(Some);
    }

    let input = args.input.clone().unwrap_or_else(|| PathBuf::from("."));
    let dir = if input.is_file() {
        input.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        input
    };
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        // The use case reports the invalid input path
        return Ok(None);
    }
    config::discover_config(&dir)
}

/// Merges configuration file values with command-line values; the command line wins.
fn build_request(args: Args, config: Option<ConfigFile>) -> AnalysisRequest {
    let config = config.unwrap_or_default();

    let mut metadata = config.metadata;
    for (key, value) in args.metadata {
        metadata.insert(key, value);
    }

    let mut exclude_paths = config.exclude_paths;
    exclude_paths.extend(args.exclude);

    AnalysisRequest {
        input: args.input,
        name: args.name.or(config.name),
        version: args.bom_version.or(config.version),
        metadata: metadata.into_iter().collect(),
        exclude_paths,
        disabled_analyzers: config.disabled_analyzers,
    }
}

fn default_output_path(root: &Path, bom_name: &str) -> PathBuf {
    let file_stem: String = bom_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();
    root.join(format!("{}.bomgraph.json", file_stem))
}
