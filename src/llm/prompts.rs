use crate::llm::ToolSpec;
use once_cell::sync::Lazy;
use serde_json::json;

/// Splits a mixed instruction into separate addition and removal requests.
pub const SEPARATE_SCOPE: &str = "\
You split project scheduling instructions into scope additions and scope removals.
Reply with JSON only, in this shape:
{\"additions\": [\"...\"], \"removals\": [\"...\"]}
Each entry is a self-contained instruction. If the user only adds or only removes,
return an empty array for the other key. Do not invent work the user did not mention.";

/// Turns an addition request into concrete activities and relationships.
/// The current schedule is appended so the model can reference existing
/// activities by name.
pub const ADD_SCOPE: &str = "\
You turn a scope addition request into schedule entities. Reply with JSON only:
{
  \"activities\": [{\"name\": \"...\", \"description\": \"...\", \"duration\": 3.0}],
  \"relationships\": [{\"predecessor\": \"name\", \"successor\": \"name\", \"relation\": \"FS\", \"lag\": 0.0}]
}
Durations and lags are in working days. Valid relation types: FS, SS, FF, SF.
Relationships may reference activities you are adding or activities already in the
schedule, always by exact name. Return empty arrays when nothing applies.";

/// Turns a removal request into named entities to delete.
pub const REMOVE_SCOPE: &str = "\
You turn a scope removal request into schedule entities to delete. Reply with JSON only:
{
  \"activities\": [\"exact activity name\"],
  \"relationships\": [{\"predecessor\": \"name\", \"successor\": \"name\", \"relation\": \"FS\"}]
}
Only name entities that exist in the schedule provided. Return empty arrays when
nothing applies.";

/// Drives the read-only lookup loop: the model inspects the schedule
/// through tools, then answers in plain text.
pub const READ_SCOPE: &str = "\
You answer questions about a project schedule. Use the provided tools to inspect
the schedule before answering. Durations and lags are in working days. When you
have what you need, answer concisely in plain text.";

pub static READ_SCOPE_TOOLS: Lazy<Vec<ToolSpec>> = Lazy::new(|| {
    vec![
        ToolSpec {
            name: "list_activities",
            description: "List every activity in the schedule with name, description and duration.",
            parameters: json!({"type": "object", "properties": {}, "required": []}),
        },
        ToolSpec {
            name: "list_relationships",
            description: "List every precedence relationship with its type and lag.",
            parameters: json!({"type": "object", "properties": {}, "required": []}),
        },
        ToolSpec {
            name: "find_activities",
            description: "Semantic search over activities. Returns the closest matches.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "What to look for."}
                },
                "required": ["query"]
            }),
        },
        ToolSpec {
            name: "find_relationships",
            description: "Semantic search over relationships. Returns the closest matches.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "What to look for."}
                },
                "required": ["query"]
            }),
        },
        ToolSpec {
            name: "critical_path",
            description: "Compute the critical path and project duration.",
            parameters: json!({"type": "object", "properties": {}, "required": []}),
        },
    ]
});
