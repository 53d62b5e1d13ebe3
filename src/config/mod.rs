mod tool_config;

pub use tool_config::{ToolConfig, ToolConfigError};
