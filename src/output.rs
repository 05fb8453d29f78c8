//! Output formatting for the CLI
//!
//! Table output is meant for people; JSON output keeps every field in its raw
//! form for scripts.

use costgpt_core::types::{CostBreakdown, PriceEntry, TokenCounts, UsageEvent};
use costgpt_pricing::{PRICING_SNAPSHOT, PriceCatalog};
use prettytable::{Table, format, row};
use serde_json::{Value, json};

/// A priced call, as shown by `costgpt cost`
#[derive(Debug, Clone, Copy)]
pub struct CostQuote<'a> {
    /// Name the caller asked about
    pub model: &'a str,
    /// Catalog entry it resolved to, if any
    pub resolved: Option<&'a PriceEntry>,
    pub tokens: TokenCounts,
    pub cost: CostBreakdown,
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format the whole price catalog
    fn format_models(&self, catalog: &PriceCatalog) -> String;

    /// Format a single cost calculation
    fn format_cost(&self, quote: &CostQuote<'_>) -> String;

    /// Format a recorded usage event
    fn format_event(&self, event: &UsageEvent) -> String;
}

/// Human-readable tables
pub struct TableFormatter;

impl TableFormatter {
    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    /// Per-call costs are often fractions of a cent
    fn format_currency(amount: f64) -> String {
        format!("${amount:.6}")
    }

    fn format_rate(per_million: f64) -> String {
        format!("${per_million:.2}")
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }
}

impl OutputFormatter for TableFormatter {
    fn format_models(&self, catalog: &PriceCatalog) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Model", b -> "Input / 1M", b -> "Output / 1M"]);

        for entry in catalog.entries() {
            table.add_row(row![
                entry.model,
                r -> Self::format_rate(entry.pricing.input_per_million),
                r -> Self::format_rate(entry.pricing.output_per_million)
            ]);
        }

        let mut aliases = Self::new_table();
        aliases.set_titles(row![b -> "Alias", b -> "Model"]);
        for (alias, canonical) in catalog.aliases() {
            aliases.add_row(row![alias, canonical]);
        }

        format!(
            "Prices as of {PRICING_SNAPSHOT} (USD per million tokens)\n{table}\n{aliases}"
        )
    }

    fn format_cost(&self, quote: &CostQuote<'_>) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "", b -> "Tokens", b -> "Cost"]);
        table.add_row(row![
            "Input",
            r -> Self::format_number(quote.tokens.input_tokens),
            r -> Self::format_currency(quote.cost.input_cost)
        ]);
        table.add_row(row![
            "Output",
            r -> Self::format_number(quote.tokens.output_tokens),
            r -> Self::format_currency(quote.cost.output_cost)
        ]);
        table.add_row(row![
            b -> "TOTAL",
            br -> Self::format_number(quote.tokens.total()),
            br -> Self::format_currency(quote.cost.total_cost)
        ]);

        let header = match quote.resolved {
            Some(entry) if entry.model.as_str() == quote.model => format!("Model: {}", quote.model),
            Some(entry) => format!("Model: {} (priced as {})", quote.model, entry.model),
            None => format!("Model: {} (not in catalog, priced at $0)", quote.model),
        };

        format!("{header}\n{table}")
    }

    fn format_event(&self, event: &UsageEvent) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Field", b -> "Value"]);
        table.add_row(row!["id", event.id()]);
        table.add_row(row!["timestamp", event.timestamp().to_rfc3339()]);
        table.add_row(row!["model", event.model()]);
        table.add_row(row!["input tokens", r -> Self::format_number(event.input_tokens())]);
        table.add_row(row!["output tokens", r -> Self::format_number(event.output_tokens())]);
        table.add_row(row!["total cost", r -> Self::format_currency(event.total_cost())]);

        if let Some(duration_ms) = event.duration_ms() {
            table.add_row(row!["duration", r -> format!("{duration_ms} ms")]);
        }
        if let Some(user_id) = event.user_id() {
            table.add_row(row!["user", user_id]);
        }
        if let Some(feature) = event.feature() {
            table.add_row(row!["feature", feature]);
        }

        let mut keys: Vec<_> = event.metadata().keys().collect();
        keys.sort();
        for key in keys {
            table.add_row(row![format!("meta.{key}"), event.metadata()[key]]);
        }

        table.to_string()
    }
}

/// Machine-readable JSON
pub struct JsonFormatter;

impl JsonFormatter {
    fn pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_models(&self, catalog: &PriceCatalog) -> String {
        let aliases: serde_json::Map<String, Value> = catalog
            .aliases()
            .into_iter()
            .map(|(alias, canonical)| (alias.to_string(), json!(canonical)))
            .collect();

        Self::pretty(&json!({
            "snapshot": PRICING_SNAPSHOT,
            "models": catalog.entries().iter().map(|e| json!({
                "model": e.model,
                "input_per_million": e.pricing.input_per_million,
                "output_per_million": e.pricing.output_per_million,
            })).collect::<Vec<_>>(),
            "aliases": aliases,
        }))
    }

    fn format_cost(&self, quote: &CostQuote<'_>) -> String {
        Self::pretty(&json!({
            "model": quote.model,
            "resolved_model": quote.resolved.map(|e| e.model.as_str()),
            "input_tokens": quote.tokens.input_tokens,
            "output_tokens": quote.tokens.output_tokens,
            "input_cost": quote.cost.input_cost,
            "output_cost": quote.cost.output_cost,
            "total_cost": quote.cost.total_cost,
        }))
    }

    fn format_event(&self, event: &UsageEvent) -> String {
        Self::pretty(&json!(event))
    }
}

/// Pick a formatter for the `--json` flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
