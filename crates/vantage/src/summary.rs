//! Variable classification and summarization.
//!
//! Turns a namespace value into a bounded, display-safe record for the
//! environment view: a coarse kind, a qualified type name, a truncated
//! textual rendering, a length, and a byte-size estimate. Summarization
//! never raises to the caller; a value that cannot be rendered degrades to
//! a name-and-type record with a logged warning.

use tracing::warn;

use crate::{
    render::{self, RenderError, RenderOptions},
    value::Value,
};

/// Maximum length of a summarized value's display string, in characters.
pub const MAX_VALUE_SUMMARY_LENGTH: usize = 1024;

/// Line width used when pretty-printing a summarized value.
pub const VALUE_PRINT_WIDTH: usize = 100;

/// Marker appended to a display string cut at the length limit.
const TRUNCATION_MARKER: &str = "...";

/// Qualified type names treated as dataframes by default.
///
/// Dataframe detection is an allow-list match on the qualified type name,
/// not structural inspection; hosts with other table types extend the list
/// through [`Summarizer::new`].
pub const DEFAULT_DATAFRAME_TYPES: &[&str] = &[
    "pandas.core.frame.DataFrame",
    "polars.dataframe.frame.DataFrame",
];

/// Display categories for variables in the user's environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// Tabular data matching the dataframe allow-list.
    Dataframe,
    /// A callable function.
    Function,
    /// Sequence-like containers: list, tuple, set, frozenset, range.
    List,
    /// Booleans, integers, and floats.
    Number,
    /// Anything without a more specific category, dicts included.
    Object,
    /// Text.
    String,
    /// Reserved for typed-array values; no classification rule currently
    /// produces it.
    Vector,
}

/// Describes one variable in the user's environment.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableSummary {
    /// Variable name.
    pub name: String,
    /// Bounded display string for the value.
    pub value: String,
    /// Display category; absent for the none value and degraded summaries.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<VariableKind>,
    /// Qualified type name (e.g. `"int"`, `"pandas.core.frame.DataFrame"`).
    pub type_name: String,
    /// Result of the value's length operation; absent for functions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub length: Option<u64>,
    /// Shallow byte-size estimate.
    pub size: u64,
}

/// Classifies and summarizes namespace values.
#[derive(Debug, Clone)]
pub struct Summarizer {
    /// Maximum display-string length in characters.
    max_value_length: usize,
    /// Pretty-print target width.
    print_width: usize,
    /// Qualified type names treated as dataframes.
    dataframe_types: Vec<String>,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(
            MAX_VALUE_SUMMARY_LENGTH,
            VALUE_PRINT_WIDTH,
            DEFAULT_DATAFRAME_TYPES.iter().map(|&name| name.to_owned()).collect(),
        )
    }
}

impl Summarizer {
    /// Creates a summarizer with explicit limits and dataframe allow-list.
    #[must_use]
    pub fn new(max_value_length: usize, print_width: usize, dataframe_types: Vec<String>) -> Self {
        Self {
            max_value_length,
            print_width,
            dataframe_types,
        }
    }

    /// Returns the display category for a value.
    ///
    /// Total and deterministic: the category depends only on the value's
    /// runtime type. The rules are order-sensitive -- string before number
    /// before sequence before function -- and only the none value has no
    /// category at all.
    #[must_use]
    pub fn classify(&self, value: &Value) -> Option<VariableKind> {
        match value {
            Value::Str(_) => Some(VariableKind::String),
            Value::Bool(_) | Value::Int(_) | Value::BigInt(_) | Value::Float(_) => Some(VariableKind::Number),
            Value::List(_) | Value::Tuple(_) | Value::Set(_) | Value::FrozenSet(_) | Value::Range { .. } => {
                Some(VariableKind::List)
            }
            Value::Function { .. } => Some(VariableKind::Function),
            Value::None => None,
            other => {
                if self.is_dataframe(other) {
                    Some(VariableKind::Dataframe)
                } else {
                    Some(VariableKind::Object)
                }
            }
        }
    }

    /// Returns true when the value's qualified type name is on the
    /// dataframe allow-list.
    #[must_use]
    pub fn is_dataframe(&self, value: &Value) -> bool {
        let qualname = value.qualified_type_name();
        self.dataframe_types.iter().any(|candidate| *candidate == qualname)
    }

    /// Produces the display summary for one variable.
    #[must_use]
    pub fn summarize(&self, name: &str, value: &Value) -> VariableSummary {
        match self.classify(value) {
            Some(VariableKind::Function) => self.summarize_function(name, value),
            Some(VariableKind::Dataframe) => self.summarize_dataframe(name, value),
            kind => self.summarize_any(name, value, kind),
        }
    }

    /// Summary for a function: `qualname(signature)`, no length.
    fn summarize_function(&self, name: &str, value: &Value) -> VariableSummary {
        let Value::Function { qualname, signature } = value else {
            return self.summarize_any(name, value, Some(VariableKind::Function));
        };
        VariableSummary {
            name: name.to_owned(),
            value: format!("{qualname}{signature}"),
            kind: Some(VariableKind::Function),
            type_name: qualname.clone(),
            length: None,
            size: value.size_bytes(),
        }
    }

    /// Summary for a dataframe: dimensions from the shape descriptor.
    ///
    /// An absent shape reads as 0 x 0; a shape with the wrong arity leaves
    /// the dimensions off entirely.
    fn summarize_dataframe(&self, name: &str, value: &Value) -> VariableSummary {
        let shape = match value {
            Value::Instance(data) => data.shape.clone().unwrap_or_else(|| vec![0, 0]),
            _ => vec![0, 0],
        };

        let mut display = String::from("DataFrame: ");
        if let [rows, columns] = shape.as_slice() {
            display.push_str(&format!("[{rows} rows x {columns} columns]"));
        }

        VariableSummary {
            name: name.to_owned(),
            value: display,
            kind: Some(VariableKind::Dataframe),
            type_name: value.qualified_type_name(),
            length: Some(value.len().unwrap_or(0)),
            size: value.size_bytes(),
        }
    }

    /// Summary for every other value, including the none value.
    fn summarize_any(&self, name: &str, value: &Value, kind: Option<VariableKind>) -> VariableSummary {
        let type_name = value.qualified_type_name();

        // Strings truncate before quoting so the pretty printer never has a
        // chance to wrap the text into chunks.
        let rendered = if let Value::Str(text) = value {
            Ok(render::str_repr(&self.truncate(text)))
        } else {
            self.format_value(value)
        };

        match rendered {
            Ok(display) => VariableSummary {
                name: name.to_owned(),
                value: display,
                kind,
                type_name,
                length: Some(value.len().unwrap_or(0)),
                size: value.size_bytes(),
            },
            Err(error) => {
                warn!("failed to summarize variable '{name}': {error}");
                self.degraded(name, type_name)
            }
        }
    }

    /// Minimal summary used when rendering a value fails: name and type
    /// only, no category.
    fn degraded(&self, name: &str, type_name: String) -> VariableSummary {
        VariableSummary {
            name: name.to_owned(),
            value: type_name.clone(),
            kind: None,
            type_name,
            length: None,
            size: 0,
        }
    }

    /// Pretty-prints a value at the configured width and truncates it.
    fn format_value(&self, value: &Value) -> Result<String, RenderError> {
        let options = RenderOptions {
            width: self.print_width,
            compact: true,
            ..RenderOptions::default()
        };
        let rendered = render::pformat(value, &options)?;
        Ok(self.truncate(&rendered))
    }

    /// Cuts a display string at the configured character limit, appending a
    /// trailing marker. Idempotent: re-truncating truncated output yields
    /// the same string.
    #[must_use]
    pub fn truncate(&self, text: &str) -> String {
        match text.char_indices().nth(self.max_value_length) {
            Some((byte_index, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_index]),
            None => text.to_owned(),
        }
    }
}
