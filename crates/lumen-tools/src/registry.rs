use std::fmt::Write;

use crate::executor::{Tool, ToolError, ToolOutput};

#[derive(Debug, Clone)]
pub struct ToolDef {
    pub id: &'static str,
    pub description: &'static str,
    pub schema: schemars::Schema,
}

/// Named set of tools offered to the agent.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Lookups return the first tool registered under an id.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.definition().id).collect()
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.definition().id == id)
            .map(|t| &**t)
    }

    /// Invoke the tool named `id` with raw `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] if no tool has that id, otherwise
    /// whatever the tool returns.
    pub async fn invoke(&self, id: &str, input: &str) -> Result<ToolOutput, ToolError> {
        let tool = self.find(id).ok_or_else(|| ToolError::UnknownTool {
            name: id.to_owned(),
        })?;
        tool.invoke(input).await
    }

    #[must_use]
    pub fn format_for_prompt(&self) -> String {
        let mut out = String::from("<tools>\n");
        for tool in &self.tools {
            format_tool(&mut out, &tool.definition());
        }
        out.push_str("</tools>");
        out
    }
}

fn format_tool(out: &mut String, tool: &ToolDef) {
    let _ = writeln!(out, "## {}", tool.id);
    let _ = writeln!(out, "{}", tool.description);
    format_schema_params(out, &tool.schema);
    out.push('\n');
}

fn format_schema_params(out: &mut String, schema: &schemars::Schema) {
    let Some(obj) = schema.as_object() else {
        return;
    };
    let Some(serde_json::Value::Object(props)) = obj.get("properties") else {
        return;
    };
    if props.is_empty() {
        return;
    }

    let required: Vec<&str> = obj
        .get("required")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let _ = writeln!(out, "Parameters:");
    for (name, prop) in props {
        let prop_obj = prop.as_object();
        let ty = prop_obj
            .and_then(|o| o.get("type"))
            .and_then(|v| v.as_str())
            .unwrap_or("string");
        let desc = prop_obj
            .and_then(|o| o.get("description"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let req = if required.contains(&name.as_str()) {
            "required"
        } else {
            "optional"
        };
        let _ = writeln!(out, "  - {name}: {desc} ({ty}, {req})");
    }
}
