//! Terminal output: Arrow tables, vertical point cards, and match reports.
//!
//! Cards render one row of a point-record batch grouped by schema section,
//! with type-aware formatting for scalars and `List<Utf8>` columns.

use arrow::array::*;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use pointwise_match::RankedTemplate;

const MAX_LIST_ITEMS: usize = 12;

// ── Schema section groupings ──

const IDENTITY: &[&str] = &["original_name", "normalized_name", "expanded_description"];

const CLASSIFICATION: &[&str] = &[
    "point_function",
    "category",
    "data_type",
    "object_type",
    "writable",
    "units",
    "equipment_type",
];

const TAGGING: &[&str] = &["tags", "tag_confidence", "warning_count"];

/// Columns shown by `normalize`; tag columns are left out.
pub const NORMALIZE_COLUMNS: &[&str] = &[
    "original_name",
    "normalized_name",
    "expanded_description",
    "point_function",
    "category",
    "units",
    "confidence",
];

/// Columns shown by `tag`.
pub const TAG_COLUMNS: &[&str] = &[
    "original_name",
    "normalized_name",
    "point_function",
    "tags",
    "tag_confidence",
    "warning_count",
];

// ── Public API ──

/// Print selected columns of a record batch as an ASCII table.
pub fn print_table(batch: &RecordBatch, columns: &[&str]) -> anyhow::Result<()> {
    let schema = batch.schema();
    let indices = columns
        .iter()
        .map(|c| schema.index_of(c))
        .collect::<Result<Vec<_>, _>>()?;
    let projected = batch.project(&indices)?;
    println!("{}", arrow::util::pretty::pretty_format_batches(&[projected])?);
    Ok(())
}

/// Print every row of a point-record batch as a card.
pub fn print_point_cards(batch: &RecordBatch, with_tags: bool) -> anyhow::Result<()> {
    for row in 0..batch.num_rows() {
        print_point_card(&batch.slice(row, 1), with_tags)?;
    }
    Ok(())
}

/// Print a single point record as a vertical card grouped by schema section.
pub fn print_point_card(batch: &RecordBatch, with_tags: bool) -> anyhow::Result<()> {
    let name = get_utf8(batch, "original_name").unwrap_or_default();
    let normalized = get_utf8(batch, "normalized_name").unwrap_or_default();

    println!("=== {} ===", name);
    if !normalized.is_empty() {
        println!("{}", normalized);
    }
    println!();

    print_section(batch, "Identity", IDENTITY);
    print_section(batch, "Classification", CLASSIFICATION);
    print_section(batch, "Quality", &["confidence"]);
    if with_tags {
        print_section(batch, "Tagging", TAGGING);
    }
    print_metadata(batch, with_tags)?;

    Ok(())
}

/// Print ranked template reports, best first.
pub fn print_ranked(ranked: &[RankedTemplate<'_>]) {
    if ranked.is_empty() {
        println!("No templates for this equipment type.");
        return;
    }
    for r in ranked {
        let report = &r.report;
        println!("=== {} ===", r.template.name);
        if let Some(desc) = &r.template.description {
            println!("{}", desc);
        }
        println!();
        println!("  {:<26} {:.2}", "aggregate_confidence", report.aggregate_confidence);
        println!("  {:<26} {:.2}", "required_match_rate", report.required_match_rate);
        println!("  {:<26} {:.2}", "total_match_rate", report.total_match_rate);
        println!();

        if !report.matches.is_empty() {
            println!("Matches ({}):", report.matches.len());
            for m in &report.matches {
                let kind = if m.exact_match { "exact" } else { "partial" };
                print!("    {:<20} -> {:<20}", m.template.id, m.observed.original_name);
                print!("  {:<8} {:.2}", kind, m.confidence);
                if m.template.is_required {
                    print!("  (required)");
                }
                println!();
            }
            println!();
        }

        if !report.recommendations.is_empty() {
            println!("Recommendations ({}):", report.recommendations.len());
            for rec in &report.recommendations {
                println!("    [{}] {}", rec.kind(), rec);
            }
            println!();
        }
    }
}

// ── Section rendering ──

fn print_section(batch: &RecordBatch, header: &str, cols: &[&str]) {
    let has_data = cols.iter().any(|&col| {
        batch
            .schema()
            .index_of(col)
            .ok()
            .is_some_and(|i| !batch.column(i).is_null(0))
    });
    if !has_data {
        return;
    }

    println!("{header}");
    for &col_name in cols {
        let idx = match batch.schema().index_of(col_name) {
            Ok(i) => i,
            Err(_) => continue,
        };
        let col = batch.column(idx);
        if col.is_null(0) {
            continue;
        }

        match col.data_type() {
            DataType::Boolean => {
                if let Some(arr) = col.as_any().downcast_ref::<BooleanArray>() {
                    println!(
                        "  {:<26} {}",
                        col_name,
                        if arr.value(0) { "yes" } else { "no" }
                    );
                }
            }
            DataType::Float32 => {
                if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
                    println!("  {:<26} {:.2}", col_name, arr.value(0));
                }
            }
            DataType::List(inner) if inner.data_type() == &DataType::Utf8 => {
                print_list_utf8(col.as_ref(), col_name);
            }
            _ => match ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default()) {
                Ok(fmt) => println!("  {:<26} {}", col_name, fmt.value(0)),
                Err(_) => println!("  {:<26} ({})", col_name, col.data_type()),
            },
        }
    }
    println!();
}

/// Warnings and applied rules from the embedded JSON payload.
fn print_metadata(batch: &RecordBatch, with_tags: bool) -> anyhow::Result<()> {
    let Some(raw) = get_utf8(batch, "metadata") else {
        return Ok(());
    };
    let payload: serde_json::Value = serde_json::from_str(&raw)?;

    let strings = |key: &str| -> Vec<String> {
        payload[key]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default()
    };

    let rules = strings("applied_rules");
    if !rules.is_empty() {
        println!("Rules");
        println!("  {}", rules.join(", "));
        println!();
    }

    let warnings = strings("warnings");
    if with_tags && !warnings.is_empty() {
        println!("Warnings ({}):", warnings.len());
        for w in warnings {
            println!("    {}", w);
        }
        println!();
    }
    Ok(())
}

// ── List<Utf8> ──

fn print_list_utf8(col: &dyn Array, col_name: &str) {
    let Some(list) = col.as_any().downcast_ref::<ListArray>() else {
        return;
    };
    let values = list.value(0);
    let Some(strings) = values.as_any().downcast_ref::<StringArray>() else {
        return;
    };
    let items: Vec<&str> = (0..strings.len())
        .filter(|&i| !strings.is_null(i))
        .map(|i| strings.value(i))
        .collect();
    if items.is_empty() {
        return;
    }
    if items.len() > MAX_LIST_ITEMS {
        println!(
            "  {:<26} {} ... and {} more",
            col_name,
            items[..MAX_LIST_ITEMS].join(", "),
            items.len() - MAX_LIST_ITEMS
        );
    } else {
        println!("  {:<26} {}", col_name, items.join(", "));
    }
}

// ── Helpers ──

fn get_utf8(batch: &RecordBatch, col_name: &str) -> Option<String> {
    let idx = batch.schema().index_of(col_name).ok()?;
    let col = batch.column(idx);
    if col.is_null(0) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(0).to_string())
}
