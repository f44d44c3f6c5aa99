use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod config_file;
mod output;

use convbench_convert::{CommandConverter, FsStore};
use convbench_core::{
    ConversionInput, ConverterRegistry, Dispatcher, Document, FidelityValidator, TextExtractor,
    ValidatorConfig, benchmark_all, benchmark_with_validation,
};
use convbench_reporting::{ExportFormat, export_benchmark, export_fidelity};
use output::ColorMode;

/// Document Conversion Benchmark - compare converter backends for speed and fidelity
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a document with one named converter
    Convert {
        /// Path to the document to convert
        file_path: PathBuf,

        /// Converter to use (see `convbench converters`)
        #[arg(short, long)]
        converter: String,

        /// Directory to store produced artifacts
        #[arg(long)]
        artifact_dir: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Run every available converter against the same document and compare
    Bench {
        /// Path to the document to convert
        file_path: PathBuf,

        /// Also score each output's fidelity against the source
        #[arg(long)]
        validate: bool,

        /// Extension of the rendered output format, used to pick the
        /// extractor for fidelity validation
        #[arg(long, default_value = "txt")]
        rendered_format: String,

        /// Directory to store produced artifacts
        #[arg(long)]
        artifact_dir: Option<PathBuf>,

        /// Write the report to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format: json, csv, markdown, text
        #[arg(long, default_value = "json")]
        export_format: ExportFormat,

        /// Path to output log file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Score an already-converted output against its source document
    Validate {
        /// Path to the source document
        source: PathBuf,

        /// Path to the converted output
        converted: PathBuf,

        /// Converter label to attach to the report
        #[arg(long, default_value = "manual")]
        converter_name: String,

        /// Write the report to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format: json, csv, markdown, text
        #[arg(long, default_value = "json")]
        export_format: ExportFormat,

        /// Path to output log file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// List configured converters and their availability
    Converters {
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            file_path,
            converter,
            artifact_dir,
            no_color,
        } => convert(file_path, converter, artifact_dir, no_color).await,
        Command::Bench {
            file_path,
            validate,
            rendered_format,
            artifact_dir,
            export,
            export_format,
            output,
            no_color,
        } => {
            bench(
                file_path,
                validate,
                rendered_format,
                artifact_dir,
                export,
                export_format,
                output,
                no_color,
            )
            .await
        }
        Command::Validate {
            source,
            converted,
            converter_name,
            export,
            export_format,
            output,
            no_color,
        } => validate_files(
            source,
            converted,
            converter_name,
            export,
            export_format,
            output,
            no_color,
        ),
        Command::Converters { no_color } => list_converters(no_color),
    }
}

async fn convert(
    file_path: PathBuf,
    converter: String,
    artifact_dir: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let dispatcher = build_dispatcher(&config, artifact_dir)?;
    let input = read_input(&file_path)?;

    let outcome = dispatcher.dispatch(&input, &converter).await;

    let color = ColorMode(!no_color);
    output::print_outcome(&mut std::io::stdout(), &outcome, color)?;
    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn bench(
    file_path: PathBuf,
    validate: bool,
    rendered_format: String,
    artifact_dir: Option<PathBuf>,
    export: Option<PathBuf>,
    export_format: ExportFormat,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let dispatcher = build_dispatcher(&config, artifact_dir)?;
    anyhow::ensure!(
        !dispatcher.registry().is_empty(),
        "no converters configured; add [[converter]] entries to .convbench.toml \
         or {}",
        config_file::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "the platform config file".to_string())
    );
    let input = read_input(&file_path)?;

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message(format!(
        "benchmarking {} converter(s)...",
        dispatcher.registry().available_names().len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let report = if validate {
        let source_extractor = extractor_for(&file_path)?;
        let rendered_extractor = convbench_extract::for_extension(&rendered_format)
            .with_context(|| format!("unsupported rendered format: {rendered_format}"))?;
        let validator = FidelityValidator::new(validator_config(&config));
        benchmark_with_validation(
            &dispatcher,
            &input,
            &validator,
            source_extractor.as_ref(),
            rendered_extractor.as_ref(),
        )
        .await
    } else {
        benchmark_all(&dispatcher, &input).await
    };

    spinner.finish_and_clear();

    let use_color = !no_color && output.is_none();
    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    output::print_benchmark(&mut writer, &report, ColorMode(use_color))?;

    if let Some(path) = export {
        export_benchmark(&report, export_format, &path)
            .with_context(|| format!("failed to export report to {}", path.display()))?;
        writeln!(writer, "\nReport written to {}", path.display())?;
    }
    Ok(())
}

fn validate_files(
    source: PathBuf,
    converted: PathBuf,
    converter_name: String,
    export: Option<PathBuf>,
    export_format: ExportFormat,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let source_extractor = extractor_for(&source)?;
    let converted_extractor = extractor_for(&converted)?;
    let source_bytes =
        std::fs::read(&source).with_context(|| format!("failed to read {}", source.display()))?;
    let converted_bytes = std::fs::read(&converted)
        .with_context(|| format!("failed to read {}", converted.display()))?;

    let validator = FidelityValidator::new(validator_config(&config));
    let report = validator.validate(
        Document::new(&source_bytes, source_extractor.as_ref()),
        Document::new(&converted_bytes, converted_extractor.as_ref()),
        &converter_name,
    );

    let use_color = !no_color && output.is_none();
    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    output::print_fidelity(&mut writer, &report, ColorMode(use_color))?;

    if let Some(path) = export {
        export_fidelity(&report, export_format, &path)
            .with_context(|| format!("failed to export report to {}", path.display()))?;
        writeln!(writer, "\nReport written to {}", path.display())?;
    }
    Ok(())
}

fn list_converters(no_color: bool) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let registry = build_registry(&config);
    let converters: Vec<(String, bool)> = registry
        .iter()
        .map(|c| (c.name().to_string(), c.is_available()))
        .collect();
    output::print_converters(&mut std::io::stdout(), &converters, ColorMode(!no_color))?;
    Ok(())
}

fn build_registry(config: &config_file::ConfigFile) -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    for entry in &config.converter {
        let mut converter =
            CommandConverter::new(&entry.name, &entry.program, entry.args.clone());
        if let Some(extension) = &entry.output_extension {
            converter = converter.with_output_extension(extension);
        }
        if let Some(secs) = entry.timeout_secs {
            converter = converter.with_timeout(Duration::from_secs(secs));
        }
        registry.register(Arc::new(converter));
    }
    registry
}

fn build_dispatcher(
    config: &config_file::ConfigFile,
    artifact_dir: Option<PathBuf>,
) -> anyhow::Result<Dispatcher> {
    // Resolve artifact directory: CLI flag > config file > temp dir.
    let dir = artifact_dir
        .or_else(|| {
            config
                .artifacts
                .as_ref()
                .and_then(|a| a.dir.as_ref())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| std::env::temp_dir().join("convbench"));

    let store = FsStore::new(&dir)
        .with_context(|| format!("failed to open artifact directory {}", dir.display()))?;
    let registry = build_registry(config);
    Ok(Dispatcher::new(Arc::new(registry), Arc::new(store)))
}

fn validator_config(config: &config_file::ConfigFile) -> ValidatorConfig {
    let defaults = ValidatorConfig::default();
    match &config.validator {
        Some(section) => ValidatorConfig {
            chars_per_unit: section.chars_per_unit.unwrap_or(defaults.chars_per_unit),
            unit_tolerance: section.unit_tolerance.unwrap_or(defaults.unit_tolerance),
        },
        None => defaults,
    }
}

fn read_input(path: &Path) -> anyhow::Result<ConversionInput> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid file name: {}", path.display()))?;
    Ok(ConversionInput::new(file_name, bytes))
}

fn extractor_for(path: &Path) -> anyhow::Result<Box<dyn TextExtractor>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    convbench_extract::for_extension(extension).with_context(|| {
        format!(
            "unsupported document format '{extension}' for {} (supported: txt, md, html)",
            path.display()
        )
    })
}
