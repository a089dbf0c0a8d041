//! Monitor templates.
//!
//! A template document is JSON in one of three shapes:
//!
//! ```text
//! { "name": "...", "type": "...", "query": "...", ... }        single template
//! { "templates": [ { "name": "...", "config": { ... } } ] }    named entries
//! any other JSON object                                         single template
//! ```
//!
//! [`customize`] expands `{service}`, `{env}` and `{namespace}` and merges the
//! derived `service:`/`env:`/`namespace:` tags. The literal `by {service}` in a
//! query is a provider grouping token and survives substitution.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{MonitorError, Result};
use crate::tags::add_tags;
use crate::types::{Monitor, Timestamp};

/// Environments a template may be instantiated for.
pub const KNOWN_ENVIRONMENTS: [&str; 4] = ["dev", "hml", "prd", "corp"];

/// Name given to documents that hold a single template.
pub const SINGLE_TEMPLATE_NAME: &str = "Single Template";

/// Name given to entries without one.
pub const UNKNOWN_TEMPLATE_NAME: &str = "Unknown Template";

const PRESERVED_GROUPING: &str = "by {service}";
const GROUPING_SENTINEL: &str = "\u{0}ddmon-grouping\u{0}";

/// Values substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    service: String,
    env: String,
    namespace: String,
}

impl Placeholders {
    /// Creates the substitution set.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Validation` if a value is blank or `env` is not
    /// one of [`KNOWN_ENVIRONMENTS`].
    pub fn new(
        service: impl Into<String>,
        env: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<Self> {
        let service = service.into().trim().to_string();
        let env = env.into().trim().to_string();
        let namespace = namespace.into().trim().to_string();

        for (flag, value) in [("service", &service), ("env", &env), ("namespace", &namespace)] {
            if value.is_empty() {
                return Err(MonitorError::validation(format!("--{flag} is required")));
            }
        }
        if !KNOWN_ENVIRONMENTS.contains(&env.as_str()) {
            return Err(MonitorError::validation(format!(
                "invalid environment: {env} (must be dev, hml, prd, or corp)"
            )));
        }

        Ok(Self {
            service,
            env,
            namespace,
        })
    }

    /// Service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Environment.
    #[must_use]
    pub fn env(&self) -> &str {
        &self.env
    }

    /// Namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The `service:`, `env:` and `namespace:` tags, in that order.
    #[must_use]
    pub fn derived_tags(&self) -> Vec<String> {
        vec![
            format!("service:{}", self.service),
            format!("env:{}", self.env),
            format!("namespace:{}", self.namespace),
        ]
    }

    fn replace(&self, text: &str, env: &str) -> String {
        text.replace("{service}", &self.service)
            .replace("{env}", env)
            .replace("{namespace}", &self.namespace)
    }

    /// Substitution for the `name` field; `{env}` is uppercased.
    #[must_use]
    pub fn substitute_name(&self, name: &str) -> String {
        self.replace(name, &self.env.to_uppercase())
    }

    /// Substitution for the `query` field.
    ///
    /// `by {service}` is kept literally and `{env}` keeps its case.
    #[must_use]
    pub fn substitute_query(&self, query: &str) -> String {
        let protected = query.replace(PRESERVED_GROUPING, GROUPING_SENTINEL);
        self.replace(&protected, &self.env)
            .replace(GROUPING_SENTINEL, PRESERVED_GROUPING)
    }

    /// Substitution for the `message` field; `{env}` keeps its case.
    #[must_use]
    pub fn substitute_message(&self, message: &str) -> String {
        self.replace(message, &self.env)
    }
}

fn substitute_field(config: &mut Map<String, Value>, key: &str, f: impl Fn(&str) -> String) {
    if let Some(Value::String(text)) = config.get_mut(key) {
        *text = f(text);
    }
}

/// Expands a template configuration into a monitor configuration.
///
/// The source is never modified. Resulting tags: the template's own tags,
/// then the derived tags, then `extra_tags`, each skipped if already present.
#[must_use]
pub fn customize(
    template: &Map<String, Value>,
    placeholders: &Placeholders,
    extra_tags: &[String],
) -> Map<String, Value> {
    let mut customized = template.clone();

    substitute_field(&mut customized, "name", |s| placeholders.substitute_name(s));
    substitute_field(&mut customized, "query", |s| placeholders.substitute_query(s));
    substitute_field(&mut customized, "message", |s| {
        placeholders.substitute_message(s)
    });

    let own: Vec<String> = match customized.get("tags") {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    let tags = add_tags(&add_tags(&own, &placeholders.derived_tags()), extra_tags);
    customized.insert(
        "tags".to_string(),
        Value::Array(tags.into_iter().map(Value::String).collect()),
    );

    customized
}

/// Converts a customized configuration into a monitor definition.
///
/// Identity and provider-computed fields copied from an exported monitor are
/// dropped.
///
/// # Errors
///
/// Returns `MonitorError::Template` if the configuration does not describe a
/// monitor or has no name.
pub fn into_monitor(template_name: &str, config: Map<String, Value>) -> Result<Monitor> {
    let mut monitor: Monitor = serde_json::from_value(Value::Object(config))
        .map_err(|e| MonitorError::template(template_name, e.to_string()))?;
    if monitor.name.trim().is_empty() {
        return Err(MonitorError::template(template_name, "monitor name is missing"));
    }
    monitor.id = None;
    monitor.overall_state = None;
    monitor.created_at = Timestamp::default();
    monitor.modified = Timestamp::default();
    Ok(monitor)
}

/// A named template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEntry {
    /// Template name (not the monitor name).
    pub name: String,
    /// Monitor configuration with placeholders.
    pub config: Map<String, Value>,
}

/// A parsed template file.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDocument {
    /// Templates in file order.
    pub entries: Vec<TemplateEntry>,
}

impl TemplateDocument {
    /// Parses a template document.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Template` for invalid JSON, a non-object
    /// document, or a non-object entry.
    pub fn parse(source_name: &str, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            MonitorError::template(source_name, format!("invalid JSON: {e}"))
        })?;
        let Value::Object(document) = value else {
            return Err(MonitorError::template(
                source_name,
                "template document must be a JSON object",
            ));
        };

        let entries = match document.get("templates") {
            Some(Value::Array(templates)) if !templates.is_empty() => templates
                .iter()
                .enumerate()
                .map(|(index, entry)| parse_entry(source_name, index, entry))
                .collect::<Result<Vec<_>>>()?,
            _ => vec![TemplateEntry {
                name: SINGLE_TEMPLATE_NAME.to_string(),
                config: document,
            }],
        };

        Ok(Self { entries })
    }

    /// Reads and parses a template file.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Template` if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let source_name = path.display().to_string();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            MonitorError::template(&source_name, format!("cannot read file: {e}"))
        })?;
        Self::parse(&source_name, &text)
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the document holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(source_name: &str, index: usize, entry: &Value) -> Result<TemplateEntry> {
    let Value::Object(entry) = entry else {
        return Err(MonitorError::template(
            source_name,
            format!("templates[{index}] must be an object"),
        ));
    };

    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_TEMPLATE_NAME)
        .to_string();

    let config = match entry.get("config") {
        Some(Value::Object(config)) => config.clone(),
        _ => {
            let mut config = entry.clone();
            config.remove("config");
            config
        }
    };

    Ok(TemplateEntry { name, config })
}

/// Lists the `*.json` files in a directory, sorted by path.
///
/// # Errors
///
/// Returns `MonitorError::Template` if the directory does not exist or holds
/// no JSON files.
pub async fn discover_templates(dir: &Path) -> Result<Vec<PathBuf>> {
    let source_name = dir.display().to_string();
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        MonitorError::template(&source_name, format!("template directory not found: {e}"))
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        let file_type = entry.file_type().await?;
        let is_file = if file_type.is_symlink() {
            tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file())
        } else {
            file_type.is_file()
        };
        if is_file {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(MonitorError::template(
            source_name,
            "no JSON template files found",
        ));
    }
    files.sort();
    Ok(files)
}
