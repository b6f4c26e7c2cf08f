use crate::{
    classify::ClassificationPolicy,
    error::{SchemaError, SchemaResult},
    resolver::ResolverOptions,
    types::FieldName,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One logical field: the names it has gone by, and where it usually sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: FieldName,
    /// Display heading for drill-down output. Defaults to `name`.
    #[serde(default)]
    pub label: Option<String>,
    /// Candidate header names, highest priority first.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Spreadsheet column letter tried when no alias matches.
    #[serde(default)]
    pub fallback: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            fallback: None,
            required: true,
        }
    }

    pub fn with_fallback(mut self, letter: &str) -> Self {
        self.fallback = Some(letter.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Everything one resolution + classification pass needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub resolver: ResolverOptions,
    #[serde(default)]
    pub policy: ClassificationPolicy,
    /// Field whose cell decides open vs closed.
    pub closing_field: FieldName,
    /// First drill-down level (e.g. broker).
    pub group_field: FieldName,
    /// Second drill-down level (e.g. client).
    pub item_field: FieldName,
    /// Fields shown for each open position, in display order.
    #[serde(default)]
    pub output_fields: Vec<FieldName>,
}

impl SchemaConfig {
    /// Load a schema from a JSON file.
    /// In tests, use SchemaConfig::long_short().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SchemaConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let config: SchemaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The long & short operations sheet: twelve fields, broker → client
    /// drill-down, open when "Data Fecho" is zero or blank.
    pub fn long_short() -> Self {
        let fields = vec![
            FieldSpec::new("Corretora", &["Corretora"]),
            FieldSpec::new("Cliente", &["Cliente"]),
            FieldSpec::new("Data Fecho", &["Data Fecho", "DataFecho"]).with_fallback("N"),
            FieldSpec::new("Data Montagem", &["Data Montagem", "DataMontagem"]),
            FieldSpec::new("Compra", &["Compra"]),
            FieldSpec::new("Financeiro Compra", &["Financeiro Compra", "Financeiro"])
                .with_fallback("H")
                .with_label("Financeiro H"),
            FieldSpec::new("Venda", &["Venda"]),
            FieldSpec::new("Financeiro Venda", &["Financeiro Venda"])
                .with_fallback("L")
                .with_label("Financeiro L"),
            FieldSpec::new("Abertura", &["Abertura"]),
            FieldSpec::new("Evolucao", &["Evolucao", "Evolução"]),
            FieldSpec::new("Evol %", &["Evol %", "Evol%", "Evolucao %", "Evolução %"]),
            FieldSpec::new("Atual", &["Atual"])
                .with_fallback("AG")
                .with_label("Atual (AG)"),
        ];
        let output_fields = [
            "Data Montagem",
            "Compra",
            "Financeiro Compra",
            "Venda",
            "Financeiro Venda",
            "Abertura",
            "Evolucao",
            "Evol %",
            "Atual",
        ]
        .iter()
        .map(|f| f.to_string())
        .collect();

        Self {
            fields,
            resolver: ResolverOptions::default(),
            policy: ClassificationPolicy::default(),
            closing_field: "Data Fecho".into(),
            group_field: "Corretora".into(),
            item_field: "Cliente".into(),
            output_fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Replace the fallback letter of `field` with a user-supplied one.
    /// An empty letter clears the fallback.
    pub fn override_fallback(&mut self, field: &str, letter: &str) -> SchemaResult<()> {
        let spec = self
            .fields
            .iter_mut()
            .find(|f| f.name == field)
            .ok_or_else(|| SchemaError::UnknownField { name: field.to_string() })?;
        let letter = letter.trim();
        spec.fallback = (!letter.is_empty()).then(|| letter.to_string());
        Ok(())
    }

    pub fn validate(&self) -> SchemaResult<()> {
        let invalid = |reason: String| Err(SchemaError::InvalidSchema { reason });

        let mut names = HashSet::new();
        for spec in &self.fields {
            if spec.name.trim().is_empty() {
                return invalid("field with empty name".into());
            }
            if !names.insert(spec.name.as_str()) {
                return invalid(format!("field '{}' declared twice", spec.name));
            }
            if spec.aliases.is_empty() && spec.fallback.is_none() {
                return invalid(format!("field '{}' has no aliases and no fallback", spec.name));
            }
        }

        for name in [&self.closing_field, &self.group_field, &self.item_field] {
            match self.field(name) {
                None => return invalid(format!("'{name}' is not a declared field")),
                Some(spec) if !spec.required => {
                    return invalid(format!("'{name}' must be a required field"));
                }
                Some(_) => {}
            }
        }
        if let Some(name) = self.output_fields.iter().find(|n| self.field(n).is_none()) {
            return invalid(format!("output field '{name}' is not a declared field"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_short_schema_is_valid() {
        let config = SchemaConfig::long_short();
        config.validate().unwrap();
        assert_eq!(config.fields.len(), 12);
        assert_eq!(config.field("Atual").unwrap().fallback.as_deref(), Some("AG"));
        assert_eq!(config.field("Atual").unwrap().display_label(), "Atual (AG)");
        assert_eq!(config.field("Cliente").unwrap().display_label(), "Cliente");
    }

    #[test]
    fn json_defaults_to_enhanced_variant() {
        let json = r#"{
            "fields": [
                { "name": "Broker", "aliases": ["Corretora"] },
                { "name": "Client", "aliases": ["Cliente"] },
                { "name": "Closed", "aliases": ["Data Fecho"], "fallback": "N" }
            ],
            "closing_field": "Closed",
            "group_field": "Broker",
            "item_field": "Client"
        }"#;
        let config = SchemaConfig::from_json(json).unwrap();
        assert!(config.resolver.enable_partial_match);
        assert!(config.policy.treat_blank_as_open);
        assert!(config.fields.iter().all(|f| f.required));
        assert!(config.output_fields.is_empty());
    }

    #[test]
    fn rejects_undeclared_references() {
        let mut config = SchemaConfig::long_short();
        config.output_fields.push("Lucro".into());
        assert!(matches!(
            config.validate(),
            Err(SchemaError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_and_unmatchable_fields() {
        let mut config = SchemaConfig::long_short();
        config.fields.push(FieldSpec::new("Compra", &["Compra 2"]));
        assert!(config.validate().is_err());

        let mut config = SchemaConfig::long_short();
        config.fields.push(FieldSpec::new("Vazio", &[]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn fallback_override_replaces_or_clears() {
        let mut config = SchemaConfig::long_short();
        config.override_fallback("Data Fecho", " m ").unwrap();
        assert_eq!(config.field("Data Fecho").unwrap().fallback.as_deref(), Some("m"));
        config.override_fallback("Data Fecho", "").unwrap();
        assert_eq!(config.field("Data Fecho").unwrap().fallback, None);
        assert!(config.override_fallback("Nope", "A").is_err());
    }
}
