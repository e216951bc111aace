mod display;
mod input;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pointwise_core::schema::point_records_batch;
use pointwise_core::{EquipmentType, HaystackTagSet, NormalizedPoint, PipelineConfig};
use pointwise_match::{MatchEngine, Template, TemplateLibrary, to_signature};
use pointwise_semantic::tokenizer::{Layer, ResolverChain};
use pointwise_semantic::{Normalizer, TagGenerator, normalize_batch, tag_batch};
use serde::Serialize;
use tracing::{info, warn};

// ── CLI ──

/// Normalize, tag, and template-match building-automation points.
#[derive(Parser, Debug)]
#[command(name = "pointwise", version, about)]
struct Cli {
    /// Pipeline configuration (JSON).
    #[arg(long, env = "POINTWISE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize raw point identifiers.
    Normalize {
        /// Point list (JSON).
        #[arg(long)]
        input: PathBuf,
        /// Equipment label used to pick the acronym dictionary, e.g. "AHU-1".
        #[arg(long)]
        equipment: Option<String>,
    },
    /// Normalize and generate Haystack tags.
    Tag {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        equipment: Option<String>,
        /// Penalize tag sets that fail consistency checks.
        #[arg(long)]
        strict: bool,
    },
    /// Build point signatures, or author a template from a reference point list.
    Signature {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        equipment: Option<String>,
        /// Emit a template library containing one template with this name.
        #[arg(long)]
        template_name: Option<String>,
        /// Identifiers whose signatures are required in the authored template.
        #[arg(long, value_delimiter = ',')]
        required: Vec<String>,
    },
    /// Match points against the templates for their equipment type.
    Match {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        equipment: String,
        /// Template library (JSON).
        #[arg(long)]
        templates: PathBuf,
        /// Only match this template.
        #[arg(long)]
        template: Option<String>,
        /// Confidence above which a match counts as successful.
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// List or query the acronym dictionaries.
    Dictionary {
        #[arg(long)]
        equipment: Option<String>,
        /// Resolve one token through the lookup chain.
        #[arg(long)]
        lookup: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Table,
    Card,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Normalize { input, equipment } => {
            cmd_normalize(&config, &input, equipment.as_deref(), cli.format)
        }
        Command::Tag {
            input,
            equipment,
            strict,
        } => {
            let mut config = config;
            config.tagging.strict_validation |= strict;
            cmd_tag(&config, &input, equipment.as_deref(), cli.format)
        }
        Command::Signature {
            input,
            equipment,
            template_name,
            required,
        } => cmd_signature(
            &config,
            &input,
            equipment.as_deref(),
            template_name,
            &required,
            cli.format,
        ),
        Command::Match {
            input,
            equipment,
            templates,
            template,
            threshold,
        } => cmd_match(
            &config,
            &input,
            &equipment,
            &templates,
            template.as_deref(),
            threshold,
            cli.format,
        ),
        Command::Dictionary { equipment, lookup } => {
            cmd_dictionary(&config, equipment.as_deref(), lookup.as_deref(), cli.format)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_json_file(p)
            .with_context(|| format!("failed to load config: {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn parse_equipment(label: &str) -> Result<EquipmentType> {
    EquipmentType::from_hint(label)
        .with_context(|| format!("unrecognized equipment type: {label:?}"))
}

/// Load and normalize a point list. Failed points are reported on stderr
/// with their identifier and reason; the rest continue.
fn normalize_input(
    config: &PipelineConfig,
    path: &Path,
    equipment: Option<&str>,
) -> Result<Vec<NormalizedPoint>> {
    let loaded = input::load_points(path)?;
    let normalizer = Normalizer::from_config(config);

    let mut failed = 0usize;
    for (identifier, err) in &loaded.rejected {
        eprintln!("skipped {identifier:?}: {err}");
        failed += 1;
    }

    let mut points = Vec::with_capacity(loaded.points.len());
    for item in normalize_batch(&normalizer, &loaded.points, equipment) {
        match item.outcome {
            Ok(p) => points.push(p),
            Err(err) => {
                eprintln!("skipped {:?}: {err}", item.identifier);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        warn!(failed, kept = points.len(), "some points were skipped");
    }
    Ok(points)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Subcommands ──

fn cmd_normalize(
    config: &PipelineConfig,
    input: &Path,
    equipment: Option<&str>,
    format: Format,
) -> Result<()> {
    let points = normalize_input(config, input, equipment)?;
    match format {
        Format::Json => print_json(&points),
        Format::Table | Format::Card => {
            // Record batches always carry tags; normalize output hides them.
            let sets = tag_batch(&TagGenerator::from_config(config), &points);
            let batch = records(&points, &sets)?;
            if format == Format::Table {
                display::print_table(&batch, display::NORMALIZE_COLUMNS)
            } else {
                display::print_point_cards(&batch, false)
            }
        }
    }
}

#[derive(Serialize)]
struct TaggedPoint<'a> {
    point: &'a NormalizedPoint,
    tags: serde_json::Value,
    confidence: f32,
    warnings: &'a [String],
}

fn cmd_tag(
    config: &PipelineConfig,
    input: &Path,
    equipment: Option<&str>,
    format: Format,
) -> Result<()> {
    let points = normalize_input(config, input, equipment)?;
    let sets = tag_batch(&TagGenerator::from_config(config), &points);

    match format {
        Format::Json => {
            let out: Vec<TaggedPoint<'_>> = points
                .iter()
                .zip(&sets)
                .map(|(point, set)| TaggedPoint {
                    point,
                    tags: set.to_haystack_json(),
                    confidence: set.confidence,
                    warnings: &set.warnings,
                })
                .collect();
            print_json(&out)
        }
        Format::Table => display::print_table(&records(&points, &sets)?, display::TAG_COLUMNS),
        Format::Card => display::print_point_cards(&records(&points, &sets)?, true),
    }
}

fn cmd_signature(
    config: &PipelineConfig,
    input: &Path,
    equipment: Option<&str>,
    template_name: Option<String>,
    required: &[String],
    format: Format,
) -> Result<()> {
    let points = normalize_input(config, input, equipment)?;

    if let Some(name) = template_name {
        let label = equipment.context("--equipment is required to author a template")?;
        let equipment_type = parse_equipment(label)?;
        let template = Template::from_points(name, equipment_type, &points, |p| {
            required.iter().any(|r| r == &p.original_name)
        });
        info!(
            template = %template.name,
            signatures = template.signatures.len(),
            required = template.required().count(),
            "authored template"
        );
        let mut library = TemplateLibrary::new();
        library.insert(template)?;
        println!("{}", library.to_json_string()?);
        return Ok(());
    }

    let mut signatures = Vec::with_capacity(points.len());
    for point in &points {
        match to_signature(point, false) {
            Ok(sig) => signatures.push(sig),
            Err(err) => eprintln!("skipped {:?}: {err}", point.original_name),
        }
    }

    match format {
        Format::Json => print_json(&signatures),
        Format::Table | Format::Card => {
            println!("{:<24} {:<32} {:<10} {:<10} {}", "id", "pattern", "function", "quantity", "units");
            for s in &signatures {
                println!(
                    "{:<24} {:<32} {:<10} {:<10} {}",
                    s.id,
                    s.pattern,
                    s.point_function.map(|f| f.as_str()).unwrap_or("-"),
                    s.quantity.map(|q| q.tag()).unwrap_or("-"),
                    s.units.as_deref().unwrap_or("-"),
                );
            }
            Ok(())
        }
    }
}

fn cmd_match(
    config: &PipelineConfig,
    input: &Path,
    equipment: &str,
    templates: &Path,
    only: Option<&str>,
    threshold: Option<f32>,
    format: Format,
) -> Result<()> {
    let equipment_type = parse_equipment(equipment)?;
    let library = TemplateLibrary::from_json_file(templates)
        .with_context(|| format!("failed to load templates: {}", templates.display()))?;
    let points = normalize_input(config, input, Some(equipment))?;

    let mut engine = MatchEngine::from_config(config);
    if let Some(t) = threshold {
        engine = engine.with_threshold(t);
    }

    let mut ranked = library.rank(equipment_type, &points, &engine)?;
    if let Some(name) = only {
        ranked.retain(|r| r.template.name == name);
        if ranked.is_empty() {
            anyhow::bail!("no template named {name:?} for {equipment_type}");
        }
    }

    match format {
        Format::Json => print_json(&ranked),
        Format::Table | Format::Card => {
            display::print_ranked(&ranked);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct DictionaryEntry<'a> {
    token: &'a str,
    expansion: &'a str,
}

fn cmd_dictionary(
    config: &PipelineConfig,
    equipment: Option<&str>,
    lookup: Option<&str>,
    format: Format,
) -> Result<()> {
    let normalizer = Normalizer::from_config(config);
    let store = normalizer.store();
    let equipment_type = equipment.map(parse_equipment).transpose()?;

    if let Some(token) = lookup {
        let chain = ResolverChain::for_equipment(equipment_type);
        match chain.resolve(store, token) {
            Some(hit) => {
                let layer = match hit.layer {
                    Layer::Equipment(eq) => eq.as_str(),
                    Layer::Generic => "generic",
                };
                match format {
                    Format::Json => print_json(&serde_json::json!({
                        "token": token,
                        "expansion": hit.expansion,
                        "layer": layer,
                    }))?,
                    _ => println!("{token} -> {} ({layer})", hit.expansion),
                }
            }
            None => println!("{token}: no expansion"),
        }
        return Ok(());
    }

    let entries: Vec<DictionaryEntry<'_>> = store
        .entries(equipment_type)
        .into_iter()
        .map(|(token, expansion)| DictionaryEntry { token, expansion })
        .collect();

    match format {
        Format::Json => print_json(&entries),
        Format::Table | Format::Card => {
            let summary = store.summary();
            println!(
                "{} generic entries, {} equipment tables ({} entries)",
                summary.generic_entries, summary.equipment_tables, summary.equipment_entries
            );
            println!();
            for e in &entries {
                println!("  {:<10} {}", e.token, e.expansion);
            }
            Ok(())
        }
    }
}

fn records(
    points: &[NormalizedPoint],
    sets: &[HaystackTagSet],
) -> Result<arrow::record_batch::RecordBatch> {
    let pairs: Vec<(&NormalizedPoint, &HaystackTagSet)> = points.iter().zip(sets).collect();
    Ok(point_records_batch(&pairs)?)
}
