//! Interpretation of the `data` payloads returned by the inference endpoints.

use serde_json::{Map, Value};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter};

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f64,
    /// Class name to probability. Only finite numbers survive.
    pub probabilities: Vec<(String, f64)>,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    Success(ClassificationResult),
    RemoteError(String),
    Malformed(String),
}

fn first_entry(data: &Value) -> Result<&Value, String> {
    match data {
        Value::Null => Err("response carried no data".into()),
        Value::Array(items) => items
            .first()
            .ok_or_else(|| "response data was empty".to_string()),
        other => Err(format!("expected a list of outputs, got {}", kind_of(other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

impl ClassificationOutcome {
    pub fn from_payload(data: &Value) -> Self {
        let entry = match first_entry(data) {
            Ok(entry) => entry,
            Err(reason) => return Self::Malformed(reason),
        };
        let Some(fields) = entry.as_object() else {
            return Self::Malformed(format!("expected an object, got {}", kind_of(entry)));
        };

        match fields.get("error") {
            None | Some(Value::Null) => {}
            Some(Value::String(message)) if !message.trim().is_empty() => {
                return Self::RemoteError(message.clone());
            }
            Some(Value::String(_)) => {
                return Self::RemoteError("the inference service reported an error".into());
            }
            Some(other) => return Self::RemoteError(other.to_string()),
        }

        let label = fields.get("class").and_then(Value::as_str);
        let probability_map = fields.get("probabilities").and_then(Value::as_object);
        if label.is_none() && probability_map.is_none() {
            return Self::Malformed("missing both class and probabilities".into());
        }

        let probabilities = probability_map.map(finite_entries).unwrap_or_default();
        let label = match label {
            Some(label) => label.to_string(),
            None => match arg_max(&probabilities) {
                Some(name) => name.to_string(),
                None => return Self::Malformed("probabilities held no numeric entries".into()),
            },
        };

        let confidence = fields
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite())
            .or_else(|| {
                probabilities
                    .iter()
                    .find(|(name, _)| *name == label)
                    .map(|(_, p)| *p)
            })
            .unwrap_or(0.0);

        Self::Success(ClassificationResult {
            label,
            confidence,
            probabilities,
            raw: entry.clone(),
        })
    }

    pub fn into_result(self) -> Result<ClassificationResult, ClientError> {
        match self {
            Self::Success(result) => Ok(result),
            Self::RemoteError(message) => Err(ClientError::RemoteError(message)),
            Self::Malformed(reason) => Err(ClientError::MalformedResponse(reason)),
        }
    }
}

fn finite_entries(map: &Map<String, Value>) -> Vec<(String, f64)> {
    map.iter()
        .filter_map(|(name, value)| match value.as_f64().filter(|p| p.is_finite()) {
            Some(p) => Some((name.clone(), p)),
            None => {
                log::warn!("Dropping malformed probability for {}: {}", name, value);
                None
            }
        })
        .collect()
}

fn arg_max(probabilities: &[(String, f64)]) -> Option<&str> {
    probabilities
        .iter()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(name, _)| name.as_str())
}

/// Reads the markdown summary returned by the text route.
pub fn interpret_summary(data: &Value) -> Result<String, ClientError> {
    let entry = first_entry(data).map_err(ClientError::MalformedResponse)?;
    let text = entry.as_str().ok_or_else(|| {
        ClientError::MalformedResponse(format!("expected text, got {}", kind_of(entry)))
    })?;
    let trimmed = text.trim();
    if trimmed == NO_IMAGE_REPLY {
        return Err(ClientError::RemoteError(trimmed.to_string()));
    }
    match ERROR_PREFIXES.iter().find_map(|prefix| trimmed.strip_prefix(prefix)) {
        Some(message) => Err(ClientError::RemoteError(message.trim().to_string())),
        None => Ok(text.to_string()),
    }
}

// Replies of the text route that report a failure instead of a summary.
const ERROR_PREFIXES: [&str; 2] = ["Error:", "An error occurred:"];
const NO_IMAGE_REPLY: &str = "Please upload an image.";

pub const SLOT_COUNT: usize = 8;

static MISSING: ImageRef = ImageRef::Missing;

/// The fixed slots of the augmentation grid, in payload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AugmentationKind {
    Original,
    Rotation,
    WidthShift,
    HeightShift,
    Shear,
    Zoom,
    Brightness,
    ChannelShift,
}

impl AugmentationKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Rotation => "Rotation",
            Self::WidthShift => "Width Shift",
            Self::HeightShift => "Height Shift",
            Self::Shear => "Shear",
            Self::Zoom => "Zoom",
            Self::Brightness => "Brightness",
            Self::ChannelShift => "Channel Shift",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Valid(String),
    Missing,
}

impl ImageRef {
    /// A bare string is a URL; an object offers `url`, then `path`.
    pub fn from_item(item: &Value) -> Self {
        let non_empty = |value: Option<&Value>| {
            value
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let reference = match item {
            Value::String(_) => non_empty(Some(item)),
            Value::Object(fields) => non_empty(fields.get("url")).or_else(|| non_empty(fields.get("path"))),
            _ => None,
        };
        reference.map_or(Self::Missing, Self::Valid)
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Valid(url) => Some(url),
            Self::Missing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugmentationSet {
    slots: Vec<(AugmentationKind, ImageRef)>,
}

impl AugmentationSet {
    pub fn from_payload(data: &Value) -> Result<Self, ClientError> {
        let items = match data {
            Value::Array(items) => items.as_slice(),
            other => {
                return Err(ClientError::MalformedResponse(format!(
                    "expected a list of images, got {}",
                    kind_of(other)
                )));
            }
        };
        if items.len() > SLOT_COUNT {
            log::warn!(
                "Augmentation returned {} images, ignoring all past {}",
                items.len(),
                SLOT_COUNT
            );
        }

        let slots: Vec<_> = AugmentationKind::iter()
            .enumerate()
            .map(|(index, kind)| {
                let reference = items.get(index).map_or(ImageRef::Missing, ImageRef::from_item);
                (kind, reference)
            })
            .collect();

        let set = Self { slots };
        if set.valid_count() == 0 {
            return Err(ClientError::MalformedResponse("no usable images returned".into()));
        }
        Ok(set)
    }

    pub fn get(&self, kind: AugmentationKind) -> &ImageRef {
        self.slots
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, reference)| reference)
            .unwrap_or(&MISSING)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(AugmentationKind, ImageRef)> {
        self.slots.iter()
    }

    pub fn valid_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|(_, reference)| matches!(reference, ImageRef::Valid(_)))
            .count()
    }
}
