use clap::Parser;
use log::{info, LevelFilter};

use gradekit::analyzer::Analyzer;
use gradekit::app::{App, AppError};
use gradekit::cli::Cli;
use gradekit::config::AnalyzerConfig;
use gradekit::llm::LlmConfig;

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags
    let log_level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let verbose = cli.verbosity > 0;
    match run(cli, verbose) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli, verbose: bool) -> Result<String, AppError> {
    let config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::new(),
    }
    .with_env();
    config.validate()?;

    // Build LLM config from environment, then apply CLI overrides
    let llm_config = LlmConfig::from_env().with_overrides(
        cli.llm.provider,
        cli.llm.model.clone(),
        cli.llm.opencode_backend.clone(),
    );

    // One command per process, so a result cache would never hit
    let mut analyzer = Analyzer::new(config);
    if let Some(client) = llm_config.create_client() {
        info!("Using external grader: {}", llm_config.model_label());
        analyzer = analyzer.with_llm_client(client);
    }

    App::new(analyzer, verbose).run(cli.command)
}
