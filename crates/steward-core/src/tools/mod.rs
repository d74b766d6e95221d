pub mod context;
pub mod handler;
pub mod registry;

pub use context::ToolContext;
pub use handler::{CatalogTool, ToolHandler};
pub use registry::Registry;
