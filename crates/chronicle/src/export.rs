//! Data export.
//!
//! [`DataExportModel`] holds the user's export choices (selected fields,
//! output format, file name) and renders a slice of serializable items into
//! the chosen format. Items are serialized through an intermediate JSON value
//! so field selection works uniformly for any `Serialize` type.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use chronicle_core::Notifier;

use crate::error::ExportError;

/// Supported export output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Pretty-printed JSON array.
    #[default]
    Json,
}

impl ExportFormat {
    /// The conventional file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Holds export choices and renders items accordingly.
pub struct DataExportModel {
    fields: Mutex<Vec<String>>,
    format: Mutex<ExportFormat>,
    export_name: Mutex<String>,
    notifier: Arc<Notifier>,
}

impl Default for DataExportModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DataExportModel {
    pub fn new() -> Self {
        Self {
            fields: Mutex::new(Vec::new()),
            format: Mutex::new(ExportFormat::default()),
            export_name: Mutex::new(String::new()),
            notifier: Arc::new(Notifier::new()),
        }
    }

    /// Notifier fired when any export choice changes.
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// The selected fields; empty means all fields.
    pub fn fields(&self) -> Vec<String> {
        self.fields.lock().clone()
    }

    pub fn set_fields(&self, fields: Vec<String>) {
        *self.fields.lock() = fields;
        self.notifier.notify();
    }

    pub fn format(&self) -> ExportFormat {
        *self.format.lock()
    }

    pub fn set_format(&self, format: ExportFormat) {
        *self.format.lock() = format;
        self.notifier.notify();
    }

    /// The file name chosen for the export, without extension.
    pub fn export_name(&self) -> String {
        self.export_name.lock().clone()
    }

    pub fn set_export_name(&self, name: impl Into<String>) {
        *self.export_name.lock() = name.into();
        self.notifier.notify();
    }

    /// The export file name with the format extension appended, falling back
    /// to the given default when no name was chosen.
    pub fn file_name(&self, default_name: &str) -> String {
        let name = self.export_name();
        let name = if name.is_empty() { default_name } else { &name };
        format!("{name}.{}", self.format().extension())
    }

    /// Whether an export can be rendered: a format is always set, so this is
    /// about having anything to render.
    pub fn can_export(&self, items_count: usize) -> bool {
        items_count > 0
    }

    /// Renders the items in the chosen format, restricted to the selected
    /// fields.
    pub fn render<T: Serialize>(&self, items: &[T]) -> Result<String, ExportError> {
        let fields = self.fields();
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let value = serde_json::to_value(item)
                .map_err(|err| ExportError::Serialize(err.to_string()))?;
            rows.push(pick_fields(value, &fields));
        }

        match self.format() {
            ExportFormat::Json => serde_json::to_string_pretty(&rows)
                .map_err(|err| ExportError::Json(err.to_string())),
            ExportFormat::Csv => render_csv(&rows, &fields),
        }
    }
}

/// Restricts an object to the given fields; an empty field list or a
/// non-object value passes through unchanged.
fn pick_fields(value: Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return value;
    }
    let Value::Object(mut map) = value else {
        return value;
    };
    let mut picked = serde_json::Map::new();
    for field in fields {
        if let Some(entry) = map.remove(field) {
            picked.insert(field.clone(), entry);
        }
    }
    Value::Object(picked)
}

fn render_csv(rows: &[Value], fields: &[String]) -> Result<String, ExportError> {
    let header: Vec<String> = if fields.is_empty() {
        rows.first()
            .and_then(Value::as_object)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        fields.to_vec()
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&header)
        .map_err(|err| ExportError::Csv(err.to_string()))?;

    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|field| {
                row.get(field)
                    .map(|value| match value {
                        Value::String(text) => text.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default()
            })
            .collect();
        writer
            .write_record(&record)
            .map_err(|err| ExportError::Csv(err.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Csv(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Run {
        number: u32,
        name: String,
        detectors: Vec<String>,
    }

    fn runs() -> Vec<Run> {
        vec![
            Run {
                number: 1,
                name: "run1".to_string(),
                detectors: vec!["ITS".to_string()],
            },
            Run {
                number: 2,
                name: "run2".to_string(),
                detectors: vec!["ITS".to_string(), "TPC".to_string()],
            },
        ]
    }

    #[test]
    fn test_json_export_all_fields() {
        let model = DataExportModel::new();
        let rendered = model.render(&runs()).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["name"], "run1");
        assert_eq!(parsed[1]["number"], 2);
    }

    #[test]
    fn test_json_export_selected_fields_only() {
        let model = DataExportModel::new();
        model.set_fields(vec!["name".to_string()]);
        let rendered = model.render(&runs()).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0], serde_json::json!({ "name": "run1" }));
    }

    #[test]
    fn test_csv_export_header_and_rows() {
        let model = DataExportModel::new();
        model.set_format(ExportFormat::Csv);
        model.set_fields(vec!["number".to_string(), "name".to_string()]);

        let rendered = model.render(&runs()).unwrap();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("number,name"));
        assert_eq!(lines.next(), Some("1,run1"));
        assert_eq!(lines.next(), Some("2,run2"));
    }

    #[test]
    fn test_file_name_falls_back_to_default() {
        let model = DataExportModel::new();
        assert_eq!(model.file_name("runs"), "runs.json");

        model.set_export_name("my-export");
        model.set_format(ExportFormat::Csv);
        assert_eq!(model.file_name("runs"), "my-export.csv");
    }

    #[test]
    fn test_choice_changes_notify() {
        let model = DataExportModel::new();
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = count.clone();
        let _id = model.notifier().observe(move || {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        model.set_format(ExportFormat::Csv);
        model.set_fields(vec!["name".to_string()]);
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
