//! Column resolver — maps logical fields onto the real columns of one table.
//!
//! RULE ORDER (first success wins):
//!   for each alias, in the caller's order:
//!     1. Exact:   normalized alias equals a normalized header
//!     2. Partial: normalized alias and header contain one another
//!                 (only when `enable_partial_match`)
//!   then, once every alias has failed:
//!     3. Positional: spreadsheet column letter, if it lands inside the header
//!   otherwise ColumnNotFound.
//!
//! Rules 1 and 2 are interleaved per alias. A partial hit on the first alias
//! beats an exact hit on the second. Do not fold them into two global passes.

use crate::{
    config::{FieldSpec, SchemaConfig},
    error::{SchemaError, SchemaResult},
    normalize::normalize,
    types::{ColumnName, FieldName},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Exact,
    Partial,
    Positional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Enhanced variant. When false only exact and positional rules run.
    #[serde(default = "default_true")]
    pub enable_partial_match: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { enable_partial_match: true }
    }
}

impl ResolverOptions {
    pub fn basic() -> Self {
        Self { enable_partial_match: false }
    }
}

/// How a column was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub column: ColumnName,
    pub index:  usize,
    pub rule:   MatchRule,
    /// The alias that matched; `None` for positional hits.
    pub alias:  Option<String>,
}

/// Decode a spreadsheet column letter: A→0, Z→25, AA→26, AG→32.
/// Returns `None` for empty input, non-letters, or overflow.
pub fn column_letter_to_index(letter: &str) -> Option<usize> {
    let letter = letter.trim();
    if letter.is_empty() {
        return None;
    }
    let mut idx: usize = 0;
    for ch in letter.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        idx = idx.checked_mul(26)?.checked_add(digit)?;
    }
    Some(idx - 1)
}

/// A per-alias rule over the (normalized key, header index) list.
type AliasStrategy = fn(&[(String, usize)], &str) -> Option<usize>;

fn exact_match(keys: &[(String, usize)], alias_key: &str) -> Option<usize> {
    keys.iter()
        .find(|(key, _)| key == alias_key)
        .map(|(_, idx)| *idx)
}

fn partial_match(keys: &[(String, usize)], alias_key: &str) -> Option<usize> {
    if alias_key.is_empty() {
        return None;
    }
    keys.iter()
        .find(|(key, _)| key.contains(alias_key) || alias_key.contains(key.as_str()))
        .map(|(_, idx)| *idx)
}

/// Resolver bound to one table header. Holds the normalized key index.
pub struct ColumnResolver<'a> {
    headers: &'a [ColumnName],
    /// (normalized key, header index) in first-seen key order. A key shared
    /// by several headers points at the last of them.
    keys:    Vec<(String, usize)>,
    options: ResolverOptions,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(headers: &'a [ColumnName], options: ResolverOptions) -> Self {
        let mut keys: Vec<(String, usize)> = Vec::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let key = normalize(header);
            match keys.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = idx,
                None => keys.push((key, idx)),
            }
        }
        Self { headers, keys, options }
    }

    fn strategies(&self) -> Vec<(MatchRule, AliasStrategy)> {
        let mut rules: Vec<(MatchRule, AliasStrategy)> =
            vec![(MatchRule::Exact, exact_match as AliasStrategy)];
        if self.options.enable_partial_match {
            rules.push((MatchRule::Partial, partial_match as AliasStrategy));
        }
        rules
    }

    fn positional_match(&self, letter: &str) -> Option<usize> {
        if letter.trim().is_empty() {
            return None;
        }
        match column_letter_to_index(letter) {
            Some(idx) if idx < self.headers.len() => Some(idx),
            Some(idx) => {
                log::warn!(
                    "fallback column '{letter}' (index {idx}) is outside the {} header columns",
                    self.headers.len()
                );
                None
            }
            None => {
                log::warn!("fallback column '{letter}' is not a column letter; ignoring it");
                None
            }
        }
    }

    /// Run the ranked rules. `None` when nothing matched.
    pub fn find<S: AsRef<str>>(&self, aliases: &[S], fallback: Option<&str>) -> Option<Resolution> {
        let strategies = self.strategies();
        for alias in aliases {
            let alias = alias.as_ref();
            let key = normalize(alias);
            for (rule, strategy) in &strategies {
                if let Some(index) = strategy(&self.keys, &key) {
                    return Some(Resolution {
                        column: self.headers[index].clone(),
                        index,
                        rule: *rule,
                        alias: Some(alias.to_string()),
                    });
                }
            }
        }

        let index = fallback.and_then(|letter| self.positional_match(letter))?;
        Some(Resolution {
            column: self.headers[index].clone(),
            index,
            rule: MatchRule::Positional,
            alias: None,
        })
    }

    /// Resolve one field or fail with `ColumnNotFound`.
    pub fn resolve<S: AsRef<str>>(
        &self,
        field: &str,
        aliases: &[S],
        fallback: Option<&str>,
    ) -> SchemaResult<Resolution> {
        match self.find(aliases, fallback) {
            Some(found) => {
                match found.rule {
                    MatchRule::Positional => log::warn!(
                        "field '{field}' resolved by position to column '{}'",
                        found.column
                    ),
                    rule => log::debug!(
                        "field '{field}' resolved to '{}' ({rule:?} on alias {:?})",
                        found.column,
                        found.alias
                    ),
                }
                Ok(found)
            }
            None => Err(SchemaError::ColumnNotFound {
                field: field.to_string(),
                aliases: aliases.iter().map(|a| a.as_ref().to_string()).collect(),
            }),
        }
    }

    pub fn resolve_field(&self, spec: &FieldSpec) -> SchemaResult<Resolution> {
        self.resolve(&spec.name, &spec.aliases, spec.fallback.as_deref())
    }
}

/// One-shot resolution returning only the column name.
pub fn resolve_column<S: AsRef<str>>(
    headers: &[ColumnName],
    aliases: &[S],
    fallback: Option<&str>,
    options: ResolverOptions,
) -> SchemaResult<ColumnName> {
    let field = aliases.first().map(|a| a.as_ref()).unwrap_or("<unnamed>");
    ColumnResolver::new(headers, options)
        .resolve(field, aliases, fallback)
        .map(|r| r.column)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub field:      FieldName,
    pub label:      String,
    pub resolution: Resolution,
}

/// Logical field → real column for one table load. Schema order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMapping {
    fields: Vec<ResolvedField>,
}

impl ResolvedMapping {
    pub fn get(&self, field: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.field == field)
    }

    pub fn column(&self, field: &str) -> SchemaResult<&str> {
        self.get(field)
            .map(|f| f.resolution.column.as_str())
            .ok_or_else(|| SchemaError::UnknownField { name: field.to_string() })
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Resolve every field of `config` against `headers`.
/// The first required field that fails aborts the whole mapping.
pub fn resolve_schema(headers: &[ColumnName], config: &SchemaConfig) -> SchemaResult<ResolvedMapping> {
    let resolver = ColumnResolver::new(headers, config.resolver.clone());
    let mut fields = Vec::with_capacity(config.fields.len());

    for spec in &config.fields {
        match resolver.resolve_field(spec) {
            Ok(resolution) => fields.push(ResolvedField {
                field: spec.name.clone(),
                label: spec.display_label().to_string(),
                resolution,
            }),
            Err(SchemaError::ColumnNotFound { .. }) if !spec.required => {
                log::info!("optional field '{}' not present; skipping", spec.name);
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "resolved {} of {} fields against {} columns",
        fields.len(),
        config.fields.len(),
        headers.len()
    );
    Ok(ResolvedMapping { fields })
}
