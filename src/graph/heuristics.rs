//! Type inference heuristics for literal input ports.
//!
//! Classification is a pure function: literal kind first (numbers, booleans
//! and structured values map directly), then a lower-cased port-name
//! substring match against an ordered keyword table, then `string`. The rule
//! table is non-exhaustive by design; `string`/`any` are open-world
//! fallbacks, not defects. Cached parses and generated keys depend on this
//! being stable for identical input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Semantic type assigned to an exposable parameter or output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Image,
    Mask,
    Model,
    Video,
    Audio,
    Color,
    File,
    Json,
    Any,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Image => "image",
            ParamType::Mask => "mask",
            ParamType::Model => "model",
            ParamType::Video => "video",
            ParamType::Audio => "audio",
            ParamType::Color => "color",
            ParamType::File => "file",
            ParamType::Json => "json",
            ParamType::Any => "any",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered port-name keyword rules. First match wins.
const NAME_RULES: &[(&str, ParamType)] = &[
    ("image", ParamType::Image),
    ("img", ParamType::Image),
    ("mask", ParamType::Mask),
    ("model", ParamType::Model),
    ("video", ParamType::Video),
    ("audio", ParamType::Audio),
    ("color", ParamType::Color),
    ("colour", ParamType::Color),
    ("file", ParamType::File),
    ("path", ParamType::File),
];

/// Classify a literal input by value kind, then port name, then `string`.
pub fn infer_param_type(port: &str, value: &Value) -> ParamType {
    match value {
        Value::Number(_) => return ParamType::Number,
        Value::Bool(_) => return ParamType::Boolean,
        Value::Array(_) | Value::Object(_) => return ParamType::Json,
        _ => {}
    }
    let lowered = port.to_lowercase();
    for (needle, param_type) in NAME_RULES {
        if lowered.contains(needle) {
            return *param_type;
        }
    }
    ParamType::String
}
