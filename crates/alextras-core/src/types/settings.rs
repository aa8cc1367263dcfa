//! Typed settings schema declared by each module.
//!
//! A schema is an ordered list of `(key, descriptor)` pairs. Each
//! descriptor is a tagged union over the supported widget kinds, carrying
//! kind-specific constraints and a default value. Schemas are checked once
//! at registration time and values are checked against them on write.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Display variant of a free-text setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextVariant {
    /// Single-line input.
    #[default]
    Text,
    /// Masked single-line input.
    Password,
    /// Multi-line input.
    Multiline,
}

/// Kind-specific part of a setting descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingKind {
    /// On/off switch.
    Toggle {
        /// Default state.
        #[serde(default)]
        default: bool,
    },
    /// One value out of a fixed option set.
    Select {
        /// `(value, label)` pairs in display order.
        options: Vec<(String, String)>,
        /// Default option value.
        #[serde(default)]
        default: Option<String>,
    },
    /// `#rrggbb` color.
    Color {
        /// Default color.
        #[serde(default)]
        default: Option<String>,
    },
    /// Bounded number.
    Number {
        /// Inclusive lower bound.
        #[serde(default)]
        min: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default)]
        max: Option<f64>,
        /// Input increment.
        #[serde(default)]
        step: Option<f64>,
        /// Default value.
        #[serde(default)]
        default: Option<f64>,
    },
    /// Free text.
    Text {
        /// How the input is displayed.
        #[serde(default)]
        variant: TextVariant,
        /// Minimum length in characters.
        #[serde(default)]
        min_length: Option<usize>,
        /// Maximum length in characters.
        #[serde(default)]
        max_length: Option<usize>,
        /// Default value.
        #[serde(default)]
        default: Option<String>,
    },
}

/// A single declared setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDescriptor {
    /// Label shown next to the input.
    pub label: String,
    /// Optional help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind discriminant and constraints.
    #[serde(flatten)]
    pub kind: SettingKind,
}

impl SettingDescriptor {
    /// Create an on/off setting.
    pub fn toggle(label: &str, default: bool) -> Self {
        Self::from_kind(label, SettingKind::Toggle { default })
    }

    /// Create a select setting from `(value, label)` pairs.
    pub fn select(label: &str, options: &[(&str, &str)], default: Option<&str>) -> Self {
        Self::from_kind(
            label,
            SettingKind::Select {
                options: options
                    .iter()
                    .map(|(value, text)| (value.to_string(), text.to_string()))
                    .collect(),
                default: default.map(str::to_string),
            },
        )
    }

    /// Create a color setting.
    pub fn color(label: &str, default: Option<&str>) -> Self {
        Self::from_kind(
            label,
            SettingKind::Color {
                default: default.map(str::to_string),
            },
        )
    }

    /// Create a bounded number setting.
    pub fn number(label: &str, min: Option<f64>, max: Option<f64>, default: Option<f64>) -> Self {
        Self::from_kind(
            label,
            SettingKind::Number {
                min,
                max,
                step: None,
                default,
            },
        )
    }

    /// Create a free-text setting.
    pub fn text(label: &str, variant: TextVariant, default: Option<&str>) -> Self {
        Self::from_kind(
            label,
            SettingKind::Text {
                variant,
                min_length: None,
                max_length: None,
                default: default.map(str::to_string),
            },
        )
    }

    fn from_kind(label: &str, kind: SettingKind) -> Self {
        Self {
            label: label.to_string(),
            description: None,
            kind,
        }
    }

    /// Attach help text.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// The default value as JSON, if the descriptor declares one.
    pub fn default_value(&self) -> Option<Value> {
        match &self.kind {
            SettingKind::Toggle { default } => Some(Value::Bool(*default)),
            SettingKind::Select { default, .. }
            | SettingKind::Color { default }
            | SettingKind::Text { default, .. } => default.clone().map(Value::String),
            SettingKind::Number { default, .. } => default.map(|n| serde_json::json!(n)),
        }
    }

    /// Check the descriptor's own constraints.
    pub fn check(&self) -> Result<(), String> {
        match &self.kind {
            SettingKind::Toggle { .. } => Ok(()),
            SettingKind::Select { options, default } => {
                if options.is_empty() {
                    return Err("select setting has no options".to_string());
                }
                match default {
                    Some(d) if !options.iter().any(|(value, _)| value == d) => {
                        Err(format!("default '{d}' is not one of the options"))
                    }
                    _ => Ok(()),
                }
            }
            SettingKind::Color { default } => match default {
                Some(d) if !is_hex_color(d) => Err(format!("default '{d}' is not a #rrggbb color")),
                _ => Ok(()),
            },
            SettingKind::Number {
                min,
                max,
                step,
                default,
            } => {
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(format!("min {lo} is greater than max {hi}"));
                    }
                }
                if let Some(s) = step {
                    if *s <= 0.0 {
                        return Err(format!("step {s} must be positive"));
                    }
                }
                match default {
                    Some(d) => check_number(*d, *min, *max),
                    None => Ok(()),
                }
            }
            SettingKind::Text {
                min_length,
                max_length,
                default,
                ..
            } => {
                if let (Some(lo), Some(hi)) = (min_length, max_length) {
                    if lo > hi {
                        return Err(format!("min_length {lo} is greater than max_length {hi}"));
                    }
                }
                match default {
                    Some(d) => check_length(d, *min_length, *max_length),
                    None => Ok(()),
                }
            }
        }
    }

    /// Check a candidate value against this descriptor.
    pub fn check_value(&self, value: &Value) -> Result<(), String> {
        match &self.kind {
            SettingKind::Toggle { .. } => value
                .as_bool()
                .map(|_| ())
                .ok_or_else(|| format!("expected a boolean, got {value}")),
            SettingKind::Select { options, .. } => {
                let v = value
                    .as_str()
                    .ok_or_else(|| format!("expected a string, got {value}"))?;
                if options.iter().any(|(option, _)| option == v) {
                    Ok(())
                } else {
                    Err(format!("'{v}' is not one of the options"))
                }
            }
            SettingKind::Color { .. } => {
                let v = value
                    .as_str()
                    .ok_or_else(|| format!("expected a string, got {value}"))?;
                if is_hex_color(v) {
                    Ok(())
                } else {
                    Err(format!("'{v}' is not a #rrggbb color"))
                }
            }
            SettingKind::Number { min, max, .. } => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| format!("expected a number, got {value}"))?;
                check_number(v, *min, *max)
            }
            SettingKind::Text {
                min_length,
                max_length,
                ..
            } => {
                let v = value
                    .as_str()
                    .ok_or_else(|| format!("expected a string, got {value}"))?;
                check_length(v, *min_length, *max_length)
            }
        }
    }
}

fn check_number(value: f64, min: Option<f64>, max: Option<f64>) -> Result<(), String> {
    if min.is_some_and(|lo| value < lo) || max.is_some_and(|hi| value > hi) {
        Err(format!("{value} is out of range"))
    } else {
        Ok(())
    }
}

fn check_length(value: &str, min: Option<usize>, max: Option<usize>) -> Result<(), String> {
    let len = value.chars().count();
    if min.is_some_and(|lo| len < lo) || max.is_some_and(|hi| len > hi) {
        Err(format!("length {len} is out of range"))
    } else {
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Ordered mapping from setting key to descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsSchema(Vec<(String, SettingDescriptor)>);

impl SettingsSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a setting. Order of calls is display order.
    pub fn with(mut self, key: &str, descriptor: SettingDescriptor) -> Self {
        self.0.push((key.to_string(), descriptor));
        self
    }

    /// Look up a descriptor by key.
    pub fn get(&self, key: &str) -> Option<&SettingDescriptor> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingDescriptor)> {
        self.0.iter().map(|(k, d)| (k.as_str(), d))
    }

    /// Number of declared settings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no settings are declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check every descriptor and reject duplicate keys.
    pub fn validate(&self) -> Result<(), AppError> {
        for (index, (key, descriptor)) in self.0.iter().enumerate() {
            if key.is_empty() {
                return Err(AppError::validation("Setting key must not be empty"));
            }
            if self.0[..index].iter().any(|(k, _)| k == key) {
                return Err(AppError::validation(format!(
                    "Setting '{key}' is declared more than once"
                )));
            }
            descriptor
                .check()
                .map_err(|e| AppError::validation(format!("Setting '{key}': {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_schema() {
        let schema = SettingsSchema::new()
            .with("showIcon", SettingDescriptor::toggle("Show icon", true))
            .with(
                "layout",
                SettingDescriptor::select("Layout", &[("grid", "Grid"), ("list", "List")], Some("grid")),
            )
            .with("volume", SettingDescriptor::number("Volume", Some(0.0), Some(100.0), Some(50.0)))
            .with("accent", SettingDescriptor::color("Accent", Some("#3db4f2")));
        assert!(schema.validate().is_ok());
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.iter().next().map(|(k, _)| k), Some("showIcon"));
    }

    #[test]
    fn test_select_default_must_be_an_option() {
        let schema = SettingsSchema::new().with(
            "layout",
            SettingDescriptor::select("Layout", &[("grid", "Grid")], Some("table")),
        );
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_number_default_out_of_range() {
        let schema = SettingsSchema::new().with(
            "volume",
            SettingDescriptor::number("Volume", Some(0.0), Some(100.0), Some(150.0)),
        );
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let schema = SettingsSchema::new()
            .with("a", SettingDescriptor::toggle("A", false))
            .with("a", SettingDescriptor::toggle("A again", true));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_check_value() {
        let volume = SettingDescriptor::number("Volume", Some(0.0), Some(100.0), None);
        assert!(volume.check_value(&json!(40)).is_ok());
        assert!(volume.check_value(&json!(140)).is_err());
        assert!(volume.check_value(&json!("loud")).is_err());

        let accent = SettingDescriptor::color("Accent", None);
        assert!(accent.check_value(&json!("#ff00aa")).is_ok());
        assert!(accent.check_value(&json!("red")).is_err());
    }

    #[test]
    fn test_default_value() {
        assert_eq!(
            SettingDescriptor::toggle("Show", true).default_value(),
            Some(json!(true))
        );
        assert_eq!(
            SettingDescriptor::text("Token", TextVariant::Password, None).default_value(),
            None
        );
    }

    #[test]
    fn test_descriptor_serializes_with_kind_tag() {
        let value = serde_json::to_value(SettingDescriptor::toggle("Show", false)).unwrap();
        assert_eq!(value["kind"], "toggle");
        assert_eq!(value["label"], "Show");
    }
}
