use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classification::{Classification, ToolGroup};

/// A JSON Schema payload, opaque to everything but the LLM client and the
/// parameter validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSchema(Value);

impl InputSchema {
    pub fn new(schema: Value) -> Self {
        Self(schema)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn empty_object() -> Self {
        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert(
            "properties".to_string(),
            Value::Object(serde_json::Map::new()),
        );
        Self(Value::Object(schema))
    }
}

impl From<schemars::Schema> for InputSchema {
    fn from(schema: schemars::Schema) -> Self {
        Self(serde_json::to_value(&schema).unwrap_or(Value::Null))
    }
}

/// Static declaration for a catalog entry, analogous to a row in §4.3's
/// tool table: name, human description, schema, classification, and the
/// display grouping used only by `tools list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub input_schema: InputSchema,
    pub classification: Classification,
    pub group: ToolGroup,
}

/// A structured invocation request emitted by the LLM: an opaque call id,
/// the catalog name it targets, and the raw parameter object (validated
/// against the catalog schema by the Execution Engine, not here).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub parameters: Value,
}
