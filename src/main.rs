//! Schemabridge CLI - cross-database migration planning

use anyhow::Context;
use clap::{Parser, Subcommand};
use schemabridge::address::StubResolver;
use schemabridge::capability::{builtin_table, data_type_capability};
use schemabridge::compare::{ComparisonMode, ComparisonOptions, Snapshot};
use schemabridge::config::{default_config_path, load_config, load_registry, write_config, PlannerConfig};
use schemabridge::context::ConversionRequest;
use schemabridge::matrix::{ConversionMatrix, MatrixCache};
use schemabridge::model::Protocol;
use schemabridge::ui::{self, Icons};
use schemabridge::{
    ComparisonEngine, ComparisonResult, ContextManager, MatrixGenerator, Navigator, ObjectType, RegistryHandle,
    UnifiedModel, UnifiedModelEnrichment, UserConversionContext,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "schemabridge")]
#[command(version)]
#[command(about = "Cross-database migration planning over a unified schema model")]
#[command(long_about = r#"
Schemabridge plans schema migrations between database technologies:
  • Conversion matrices between relational, document, graph, vector and streaming stores
  • Structural and enrichment-guided schema comparison
  • User conversion contexts that answer conversion decisions
  • Typed resource addresses resolved against a unified model

Example usage:
  schemabridge matrix postgres mongodb
  schemabridge compare old.json new.json --mode guided
  schemabridge resolve model.json "database://data/table/users/column:email"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Drop headers, sections and colors (also SCHEMABRIDGE_QUIET=1)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file (defaults to ./schemabridge.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file
    Init {
        /// Registry file to overlay on the built-in registry
        #[arg(short, long)]
        registry: Option<String>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// List registered technologies
    Technologies,

    /// Show object-type or data-type capabilities
    Capabilities {
        /// Object type to describe (all types when omitted)
        object_type: Option<String>,

        /// Classify a data type name instead
        #[arg(short, long)]
        data_type: Option<String>,
    },

    /// Generate the conversion matrix for a technology pair
    Matrix {
        source: String,
        target: String,

        /// Context file whose decision answers are applied
        #[arg(long)]
        context: Option<PathBuf>,
    },

    /// Compare two unified model snapshots
    Compare {
        /// Old model (JSON)
        old: PathBuf,

        /// New model (JSON)
        new: PathBuf,

        /// Enrichment for the old model (JSON)
        #[arg(long)]
        old_enrichment: Option<PathBuf>,

        /// Enrichment for the new model (JSON)
        #[arg(long)]
        new_enrichment: Option<PathBuf>,

        /// Comparison mode (structural, guided, enriched)
        #[arg(short, long)]
        mode: Option<String>,

        /// Only compare objects whose names match these globs
        #[arg(long)]
        include: Vec<String>,

        /// Skip objects whose names match these globs
        #[arg(long)]
        exclude: Vec<String>,

        /// Do not fold conversion-matrix complexity into the score
        #[arg(long)]
        no_matrix: bool,

        /// Exit with status 1 when breaking changes are found
        #[arg(long)]
        fail_on_breaking: bool,
    },

    /// Manage user conversion contexts
    Context {
        #[command(subcommand)]
        action: ContextCommand,
    },

    /// Resolve a resource address against a unified model
    Resolve {
        /// Unified model (JSON)
        model: PathBuf,

        /// Address, e.g. database://data/table/users/column:email
        address: String,
    },
}

#[derive(Subcommand)]
enum ContextCommand {
    /// Create an empty context
    New {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        source: String,

        #[arg(short, long)]
        target: String,

        /// Write the context here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a context file
    Validate { file: PathBuf },

    /// Merge contexts left to right
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a context to a conversion request, or to the matrix for its pair
    Apply {
        context: PathBuf,

        /// Conversion request (JSON)
        #[arg(short, long)]
        request: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.quiet {
        ui::set_quiet();
    }

    let json = cli.format == "json";
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(Some(&config_path))?;
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let matrices = MatrixCache::new();

    match cli.command {
        Commands::Init { registry, force } => {
            let config = PlannerConfig {
                registry,
                ..PlannerConfig::default()
            };
            write_config(&config_path, &config, force)?;
            ui::success(&format!("Wrote {}", config_path.display()));
        }

        Commands::Technologies => {
            let registry = load_registry(config.as_ref(), base)?;
            if json {
                let entries: Vec<_> = registry.technologies().collect();
                return print_json(&entries);
            }
            ui::header(&format!("{} registered technologies", registry.len()));
            println!("{}", ui::technologies_table(&registry));
        }

        Commands::Capabilities { object_type, data_type } => {
            show_capabilities(object_type.as_deref(), data_type.as_deref(), json)?;
        }

        Commands::Matrix { source, target, context } => {
            let handle = RegistryHandle::new(load_registry(config.as_ref(), base)?);
            let generator = MatrixGenerator::from_handle(&handle);
            let mut matrix = matrices.get_or_generate(&generator, &source, &target)?;
            if let Some(path) = context {
                let context: UserConversionContext = read_json(&path)?;
                matrix = Arc::new(ContextManager::new().apply_to_matrix(&matrix, &context)?);
            }
            if json {
                return print_json(&*matrix);
            }
            show_matrix(&matrix)?;
        }

        Commands::Compare {
            old,
            new,
            old_enrichment,
            new_enrichment,
            mode,
            include,
            exclude,
            no_matrix,
            fail_on_breaking,
        } => {
            let mut options = config.as_ref().map(|c| c.compare.clone()).unwrap_or_default();
            if let Some(mode) = mode {
                options.mode = mode.parse::<ComparisonMode>().map_err(anyhow::Error::msg)?;
            }
            options = include.into_iter().fold(options, ComparisonOptions::include_name);
            options = exclude.into_iter().fold(options, ComparisonOptions::exclude_name);

            let old_model: UnifiedModel = read_json(&old)?;
            let new_model: UnifiedModel = read_json(&new)?;
            let old_enrichment: Option<UnifiedModelEnrichment> = old_enrichment.as_deref().map(read_json).transpose()?;
            let new_enrichment: Option<UnifiedModelEnrichment> = new_enrichment.as_deref().map(read_json).transpose()?;

            let mut engine = ComparisonEngine::new(options)?;
            if !no_matrix {
                engine = engine.with_generator(MatrixGenerator::new(Arc::new(load_registry(
                    config.as_ref(),
                    base,
                )?)));
            }

            let result = engine.compare(
                snapshot(&old_model, old_enrichment.as_ref()),
                snapshot(&new_model, new_enrichment.as_ref()),
            );
            if json {
                print_json(&result)?;
            } else {
                show_comparison(&result);
            }
            if fail_on_breaking && result.has_breaking_changes() {
                std::process::exit(1);
            }
        }

        Commands::Context { action } => run_context(action, config.as_ref(), base, &matrices, json)?,

        Commands::Resolve { model, address } => {
            let model: UnifiedModel = read_json(&model)?;
            let navigator = Navigator::new(&model)
                .with_resolver(Protocol::Stream, StubResolver)
                .with_resolver(Protocol::Webhook, StubResolver);
            let location = navigator.resolve_str(&address)?;
            if json {
                return print_json(&location);
            }

            ui::header(&format!("Resolved {}", location.address));
            ui::status(Icons::DATABASE, "Object", &format!("{} {}", location.object_type, location.parent));
            if let (Some(child), Some(kind)) = (&location.child, location.child_kind) {
                ui::status(Icons::LINK, "Child", &format!("{} {}", kind, child));
            }
            if let Some(data_type) = &location.data_type {
                ui::status(Icons::INFO, "Data type", data_type);
            }
            if !location.nested_path.is_empty() {
                let nested: Vec<String> = location
                    .nested_path
                    .iter()
                    .map(|s| format!("{}:{}", s.kind, s.name))
                    .collect();
                ui::status(Icons::RIGHT, "Nested path", &nested.join("/"));
            }
            ui::status(Icons::MAG, "Stores values", if location.can_store_values { "yes" } else { "no" });
            if location.external {
                ui::status(Icons::LINK, "Resolved by", &format!("{} resolver", location.address.protocol));
            }
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(value)?)?;
            ui::success(&format!("Wrote {}", path.display()));
            Ok(())
        }
        None => print_json(value),
    }
}

fn snapshot<'a>(model: &'a UnifiedModel, enrichment: Option<&'a UnifiedModelEnrichment>) -> Snapshot<'a> {
    match enrichment {
        Some(enrichment) => Snapshot::new(model).with_enrichment(enrichment),
        None => Snapshot::new(model),
    }
}

fn show_capabilities(object_type: Option<&str>, data_type: Option<&str>, json: bool) -> anyhow::Result<()> {
    if let Some(name) = data_type {
        let capability = data_type_capability(name);
        if json {
            return print_json(&capability);
        }
        ui::header(&format!("Data type {}", name));
        let element = capability.element_type.clone().unwrap_or_else(|| "-".into());
        let format = capability
            .schema_format
            .map(|f| format!("{:?}", f).to_lowercase())
            .unwrap_or_else(|| "-".into());
        println!(
            "{}",
            ui::stats_table(&[
                ("Class", format!("{:?}", capability.class).to_lowercase().as_str()),
                ("Structured", yes_no(capability.is_structured)),
                ("Array", yes_no(capability.is_array)),
                ("Navigable", yes_no(capability.is_navigable)),
                ("Element type", element.as_str()),
                ("Schema format", format.as_str()),
            ])
        );
        return Ok(());
    }

    let table = builtin_table();
    match object_type {
        Some(name) => {
            let object_type: ObjectType = name.parse()?;
            let capability = table.get(object_type);
            if json {
                return print_json(capability);
            }
            ui::header(&format!("Object type {}", object_type));
            let selectors: Vec<&str> = capability.selectors.iter().map(|s| s.as_str()).collect();
            println!(
                "{}",
                ui::stats_table(&[
                    ("Stores data", yes_no(capability.can_store_data)),
                    ("Has metadata", yes_no(capability.has_metadata)),
                    ("Nesting", yes_no(capability.supports_nesting)),
                    ("Streaming", yes_no(capability.is_streaming)),
                    ("Stateless", yes_no(capability.is_stateless)),
                    ("Schema registration", yes_no(capability.requires_schema_registration)),
                    ("Selectors", selectors.join(", ").as_str()),
                ])
            );
        }
        None => {
            if json {
                let all: Vec<_> = ObjectType::all().iter().map(|&t| (t, table.get(t))).collect();
                return print_json(&all);
            }
            ui::header("Object type capabilities");
            println!("{}", ui::capabilities_table(table));
        }
    }
    Ok(())
}

fn show_matrix(matrix: &ConversionMatrix) -> anyhow::Result<()> {
    ui::header(&format!("Conversion matrix {} -> {}", matrix.source, matrix.target));
    ui::status(Icons::STATS, "Complexity", &ui::complexity_badge(matrix.complexity));

    let strategies: Vec<&str> = matrix.strategies.iter().map(|s| s.as_str()).collect();
    let unsupported: Vec<&str> = matrix.unsupported_features.iter().map(|t| t.as_str()).collect();
    let fingerprint = matrix.fingerprint()?;
    println!(
        "{}",
        ui::stats_table(&[
            ("Paradigms", matrix.paradigm_compatibility.as_str()),
            ("Strategies", strategies.join(", ").as_str()),
            ("Unsupported", unsupported.join(", ").as_str()),
            ("Requires input", yes_no(matrix.requires_user_input)),
            ("Requires enrichment", yes_no(matrix.requires_enrichment)),
            ("Fingerprint", &fingerprint[..16]),
        ])
    );

    ui::section("Rules");
    println!("{}", ui::rules_table(matrix));
    for rule in &matrix.rules {
        for note in rule.limitations.iter().chain(&rule.notes) {
            ui::summary_row(rule.source_type.as_str(), &ui::muted(note));
        }
    }

    let decisions: Vec<_> = matrix.rules.iter().flat_map(|r| &r.decisions).collect();
    if !decisions.is_empty() {
        ui::section("Decisions");
        for decision in decisions {
            ui::decision(decision);
        }
    }
    Ok(())
}

fn show_comparison(result: &ComparisonResult) {
    ui::header(&format!(
        "Comparing {} -> {} ({})",
        result.source_technology, result.target_technology, result.mode
    ));

    let summary = &result.summary;
    let enrichment_similarity = result.enrichment_similarity.map_or("-".to_string(), ui::percent);
    let matrix_complexity = result.matrix_complexity.map_or("-", |c| c.as_str());
    println!(
        "{}",
        ui::stats_table(&[
            ("Objects matched", summary.objects_matched.to_string().as_str()),
            ("Objects added", summary.objects_added.to_string().as_str()),
            ("Objects removed", summary.objects_removed.to_string().as_str()),
            ("Changes", summary.total_changes.to_string().as_str()),
            ("Breaking", summary.breaking_changes.to_string().as_str()),
            ("Structural similarity", ui::percent(result.structural_similarity).as_str()),
            ("Enrichment similarity", enrichment_similarity.as_str()),
            ("Overall similarity", ui::percent(result.overall_similarity).as_str()),
            ("Compatibility", ui::percent(result.compatibility_score).as_str()),
            ("Matrix complexity", matrix_complexity),
        ])
    );
    ui::status(Icons::STATS, "Migration complexity", &ui::complexity_badge(result.migration_complexity));

    if result.is_identical() {
        ui::success("No changes");
        return;
    }

    if !result.structural_changes.is_empty() {
        ui::section("Changes");
        println!("{}", ui::changes_table(&result.structural_changes));
    }

    if result.has_breaking_changes() {
        ui::section("Breaking");
        for change in result.breaking_changes() {
            ui::object_changed(change);
        }
        ui::warn(&format!("{} breaking changes", summary.breaking_changes));
    }

    if !result.enrichment_changes.is_empty() {
        ui::section("Enrichment changes");
        println!("{}", ui::enrichment_table(&result.enrichment_changes));
    }
}

fn run_context(
    action: ContextCommand,
    config: Option<&PlannerConfig>,
    base: &Path,
    matrices: &MatrixCache,
    json: bool,
) -> anyhow::Result<()> {
    let manager = ContextManager::new();

    match action {
        ContextCommand::New {
            user,
            source,
            target,
            output,
        } => {
            let context = manager.create(&user, &source, &target);
            write_json(&context, output.as_deref())?;
        }

        ContextCommand::Validate { file } => {
            let context: UserConversionContext = read_json(&file)?;
            let report = manager.validate(&context);
            if json {
                print_json(&report)?;
            } else {
                ui::header(&format!("Validating context {}", context.id));
                ui::status(Icons::PERSON, "User", &context.user_id);
                for finding in &report.findings {
                    let line = format!("{}: {}", finding.field, finding.message);
                    match finding.severity {
                        schemabridge::context::FindingSeverity::Critical => ui::error(&line),
                        schemabridge::context::FindingSeverity::Warning => ui::warn(&line),
                    }
                }
                if report.is_valid() {
                    ui::success("Context is valid");
                }
            }
            if !report.is_valid() {
                std::process::exit(1);
            }
        }

        ContextCommand::Merge { files, output } => {
            let contexts = files
                .iter()
                .map(|path| read_json::<UserConversionContext>(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let merged = manager.merge(&contexts)?;
            write_json(&merged, output.as_deref())?;
        }

        ContextCommand::Apply { context, request } => {
            let context: UserConversionContext = read_json(&context)?;
            match request {
                Some(path) => {
                    let request: ConversionRequest = read_json(&path)?;
                    print_json(&manager.apply_to_request(&request, &context)?)?;
                }
                None => {
                    let handle = RegistryHandle::new(load_registry(config, base)?);
                    let generator = MatrixGenerator::from_handle(&handle);
                    let (source, target) = context.technology_pair();
                    let matrix = matrices.get_or_generate(&generator, source, target)?;
                    let applied = manager.apply_to_matrix(&matrix, &context)?;
                    if json {
                        print_json(&applied)?;
                    } else {
                        show_matrix(&applied)?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
