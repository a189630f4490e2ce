//! Static tool catalog advertised by `tools/list`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Name of the single tool this server exposes.
pub const RUN_PYTHON: &str = "run_python";

/// One invocable tool, as advertised to the client.
#[derive(Debug, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

/// Object schema for a tool's `arguments`.
#[derive(Debug)]
pub struct InputSchema {
    pub properties: &'static [SchemaProperty],
    pub required: &'static [&'static str],
}

#[derive(Debug)]
pub struct SchemaProperty {
    pub name: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "object")?;
        map.serialize_entry("properties", &Properties(self.properties))?;
        map.serialize_entry("required", self.required)?;
        map.end()
    }
}

/// `properties` is a JSON object keyed by property name.
struct Properties(&'static [SchemaProperty]);

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for prop in self.0 {
            map.serialize_entry(
                prop.name,
                &serde_json::json!({
                    "type": prop.kind,
                    "description": prop.description,
                }),
            )?;
        }
        map.end()
    }
}

/// Every tool this server exposes. Fixed at compile time.
pub static TOOLS: &[ToolDescriptor] = &[ToolDescriptor {
    name: RUN_PYTHON,
    title: "Run Python",
    description: "Execute a Python code snippet and return its exit code, stdout, and stderr",
    input_schema: InputSchema {
        properties: &[SchemaProperty {
            name: "code",
            kind: "string",
            description: "Python source to execute",
        }],
        required: &["code"],
    },
}];

/// Look up a tool by name.
pub fn find(name: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|tool| tool.name == name)
}
