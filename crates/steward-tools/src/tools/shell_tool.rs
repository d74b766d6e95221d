use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShellParam {
    Sh,
    Cmd,
    Powershell,
}

fn default_timeout_sec() -> u32 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteShellCommandParams {
    pub command: String,
    pub shell: ShellParam,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u32,
}
