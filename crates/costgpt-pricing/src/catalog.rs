//! Price catalog with alias and prefix resolution
//!
//! Prices are USD per million tokens, frozen at [`PRICING_SNAPSHOT`].
//!
//! Resolution order for a raw model name:
//! 1. alias table (alternate spelling → canonical id)
//! 2. exact canonical id
//! 3. prefix match: a canonical id that is a prefix of the name, or the
//!    other way round. The candidate sharing the longest prefix with the name
//!    wins; ties go to the entry declared first.
//!
//! A miss is not an error. Callers price a miss at zero.

use costgpt_core::types::{ModelPricing, PriceEntry};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Version of the built-in price table
pub const PRICING_SNAPSHOT: &str = "2025-02";

/// Built-in prices: canonical id, input USD/M, output USD/M (declaration order)
const BUILTIN_PRICES: &[(&str, f64, f64)] = &[
    // Anthropic
    ("claude-opus-4-20250514", 15.00, 75.00),
    ("claude-sonnet-4-20250514", 3.00, 15.00),
    ("claude-3-5-sonnet-20241022", 3.00, 15.00),
    ("claude-3-5-haiku-20241022", 0.80, 4.00),
    ("claude-3-opus-20240229", 15.00, 75.00),
    ("claude-3-sonnet-20240229", 3.00, 15.00),
    ("claude-3-haiku-20240307", 0.25, 1.25),
    // OpenAI
    ("gpt-4o", 2.50, 10.00),
    ("gpt-4o-mini", 0.15, 0.60),
    ("gpt-4-turbo", 10.00, 30.00),
    ("gpt-4", 30.00, 60.00),
    ("gpt-3.5-turbo", 0.50, 1.50),
    ("o1", 15.00, 60.00),
    ("o1-mini", 3.00, 12.00),
    ("o1-preview", 15.00, 60.00),
    // Google
    ("gemini-1.5-pro", 1.25, 5.00),
    ("gemini-1.5-flash", 0.075, 0.30),
    ("gemini-2.0-flash", 0.10, 0.40),
    // Mistral
    ("mistral-large", 2.00, 6.00),
    ("mistral-small", 0.20, 0.60),
    ("codestral", 0.20, 0.60),
];

/// Built-in aliases: alternate spelling → canonical id
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("claude-3.5-sonnet", "claude-3-5-sonnet-20241022"),
    ("claude-3.5-haiku", "claude-3-5-haiku-20241022"),
    ("claude-3-5-sonnet-latest", "claude-3-5-sonnet-20241022"),
    ("claude-3-5-haiku-latest", "claude-3-5-haiku-20241022"),
    ("claude-3-opus-latest", "claude-3-opus-20240229"),
    ("gpt-4o-2024-08-06", "gpt-4o"),
    ("gpt-4o-2024-05-13", "gpt-4o"),
];

static BUILTIN: Lazy<PriceCatalog> = Lazy::new(|| {
    PriceCatalog::new(
        BUILTIN_PRICES
            .iter()
            .map(|&(model, input, output)| PriceEntry::new(model, input, output)),
        BUILTIN_ALIASES
            .iter()
            .map(|&(alias, canonical)| (alias.to_string(), canonical.to_string())),
    )
});

/// Read-only mapping from canonical model ids to prices, plus aliases
#[derive(Debug, Clone)]
pub struct PriceCatalog {
    /// Entries in declaration order
    entries: Vec<PriceEntry>,
    /// Canonical id → position in `entries`
    index: HashMap<String, usize>,
    /// Alternate spelling → canonical id
    aliases: HashMap<String, String>,
}

impl PriceCatalog {
    /// Build a catalog from entries (kept in the given order) and aliases
    ///
    /// A later entry with an already seen id replaces the earlier price but
    /// keeps the earlier position. Entries with a negative or non-finite price
    /// are skipped with a warning.
    pub fn new<E, A>(entries: E, aliases: A) -> Self
    where
        E: IntoIterator<Item = PriceEntry>,
        A: IntoIterator<Item = (String, String)>,
    {
        let mut catalog = Self {
            entries: Vec::new(),
            index: HashMap::new(),
            aliases: aliases.into_iter().collect(),
        };

        for entry in entries {
            if !is_valid_pricing(&entry.pricing) {
                warn!(
                    "Skipping catalog entry {} with invalid prices {}/{}",
                    entry.model, entry.pricing.input_per_million, entry.pricing.output_per_million
                );
                continue;
            }

            match catalog.index.get(entry.model.as_str()) {
                Some(&pos) => catalog.entries[pos] = entry,
                None => {
                    catalog
                        .index
                        .insert(entry.model.as_str().to_string(), catalog.entries.len());
                    catalog.entries.push(entry);
                }
            }
        }

        catalog
    }

    /// The built-in catalog shipped with this crate
    pub fn builtin() -> &'static PriceCatalog {
        &BUILTIN
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    /// Alias pairs, sorted by alias
    pub fn aliases(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .aliases
            .iter()
            .map(|(alias, canonical)| (alias.as_str(), canonical.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Canonical spelling for `model_name` if it is a known alias
    pub fn canonical_name<'a>(&'a self, model_name: &'a str) -> &'a str {
        self.aliases
            .get(model_name)
            .map(String::as_str)
            .unwrap_or(model_name)
    }

    /// Exact lookup by canonical id, without alias or prefix matching
    pub fn get(&self, canonical_id: &str) -> Option<&PriceEntry> {
        self.index.get(canonical_id).map(|&pos| &self.entries[pos])
    }

    /// Resolve a raw model name to a catalog entry
    ///
    /// Returns `None` when nothing matches; that is an expected outcome, not
    /// a failure.
    pub fn resolve(&self, model_name: &str) -> Option<&PriceEntry> {
        if model_name.is_empty() {
            warn!("Empty model name, pricing at zero");
            return None;
        }

        let key = self.canonical_name(model_name);
        if key != model_name {
            debug!("Resolved alias {} to {}", model_name, key);
        }

        if let Some(entry) = self.get(key) {
            return Some(entry);
        }

        match self.best_prefix_match(key) {
            Some(entry) => {
                debug!(
                    "Found pricing for {} using prefix match {}",
                    model_name, entry.model
                );
                Some(entry)
            }
            None => {
                warn!("No pricing for model {}, pricing at zero", model_name);
                None
            }
        }
    }

    /// Longest shared prefix wins, first declared wins a tie
    fn best_prefix_match(&self, key: &str) -> Option<&PriceEntry> {
        let mut best: Option<(usize, &PriceEntry)> = None;

        for entry in &self.entries {
            let id = entry.model.as_str();
            if !(key.starts_with(id) || id.starts_with(key)) {
                continue;
            }

            let shared = id.len().min(key.len());
            if best.is_none_or(|(len, _)| shared > len) {
                best = Some((shared, entry));
            }
        }

        best.map(|(_, entry)| entry)
    }

    /// Whether `model_name` resolves to any entry
    pub fn contains(&self, model_name: &str) -> bool {
        self.resolve(model_name).is_some()
    }

    /// Number of canonical entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

fn is_valid_pricing(pricing: &ModelPricing) -> bool {
    [pricing.input_per_million, pricing.output_per_million]
        .iter()
        .all(|price| price.is_finite() && *price >= 0.0)
}
