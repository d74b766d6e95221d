use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use steward_tools::{Classification, ToolError, ToolGroup, ToolResult, ToolSchema};

use super::context::ToolContext;

/// One impl per catalog entry: typed parameters in, a typed result out,
/// with the classification and display metadata carried as associated
/// constants rather than scattered
/// across a separate table.
#[async_trait]
pub trait CatalogTool: Send + Sync + 'static {
    type Params: DeserializeOwned + JsonSchema + Send;

    const NAME: &'static str;
    const DISPLAY_NAME: &'static str;
    const DESCRIPTION: &'static str;
    const CLASSIFICATION: Classification;
    const GROUP: ToolGroup;

    async fn execute(&self, params: Self::Params, ctx: &ToolContext) -> Result<ToolResult, ToolError>;

    fn schema() -> ToolSchema
    where
        Self: Sized,
    {
        let settings = schemars::generate::SchemaSettings::draft07().with(|s| {
            s.inline_subschemas = true;
        });
        let input_schema = settings.into_generator().into_root_schema_for::<Self::Params>();
        ToolSchema {
            name: Self::NAME.to_string(),
            display_name: Self::DISPLAY_NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
            input_schema: input_schema.into(),
            classification: Self::CLASSIFICATION,
            group: Self::GROUP,
        }
    }
}

/// Type-erased form of `CatalogTool`, so the registry can hold a
/// heterogeneous map of `Arc<dyn ToolHandler>` keyed by name.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn schema(&self) -> ToolSchema;
    async fn execute_erased(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError>;
}

#[async_trait]
impl<T: CatalogTool> ToolHandler for T {
    fn schema(&self) -> ToolSchema {
        T::schema()
    }

    async fn execute_erased(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let typed: T::Params = serde_json::from_value(params)
            .map_err(|e| ToolError::invalid_params(T::NAME, e.to_string()))?;

        if ctx.is_cancelled() {
            return Err(ToolError::Cancelled(T::NAME.to_string()));
        }

        self.execute(typed, ctx).await
    }
}
