//! Wire-level tool vocabulary shared between the engine and its callers:
//! typed tool calls, typed results, the classification rule, and the
//! parameter schemas for every catalog entry.

pub mod classification;
pub mod error;
pub mod result;
pub mod schema;
pub mod shell;
pub mod tools;

pub use classification::{Classification, ToolGroup};
pub use error::ToolError;
pub use result::ToolResult;
pub use schema::{InputSchema, ToolCall, ToolSchema};
