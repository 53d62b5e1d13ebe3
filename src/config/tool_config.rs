use std::{
    borrow::Cow,
    io::ErrorKind,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::PathExt;

const CONFIG_FILE_NAME: &str = "zerosize.yaml";

const DEFAULT_COMMAND: &str = "SpiderOak";
const DEFAULT_ARGS: [&str; 1] = ["--journal-changelog"];

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

fn key<'a>(name: &'static str) -> Yaml<'a> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// How to reach the backup tool, plus worker settings.
///
/// ```yaml
/// tool:
///   command: SpiderOak
///   args: ["--journal-changelog"]
/// workers: 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub command: String,
    pub args: Vec<String>,
    pub workers: Option<NonZeroUsize>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            args: DEFAULT_ARGS.iter().map(|arg| arg.to_string()).collect(),
            workers: None,
        }
    }
}

impl ToolConfig {
    /// Loads `explicit` if given, otherwise `zerosize.yaml` in `root`.
    ///
    /// Only the implicit file may be missing, in which case the defaults apply.
    pub async fn read(root: &Path, explicit: Option<&Path>) -> Result<Self, ToolConfigError> {
        if let Some(path) = explicit {
            return Self::from_path(path.to_path_buf()).await;
        }

        let path = get_config_file_path(root);
        match Self::from_path(path.clone()).await {
            Err(ToolConfigError::ReadError { source, .. })
                if source.kind() == ErrorKind::NotFound =>
            {
                info!(
                    "No config file at {}, using defaults",
                    path.best_effort_display()
                );
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, ToolConfigError> {
        debug!("Reading config file: {}", path.best_effort_display());
        let bytes = fs::read(&path).await.context(ReadSnafu {
            file_path: path.best_effort_display(),
        })?;
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_display(),
        })?;
        contents.as_str().try_into()
    }

    fn apply_tool_section(
        &mut self,
        tool: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<(), ToolConfigError> {
        if let Some(command) = tool.get(&key("command")) {
            self.command = command
                .as_str()
                .ok_or(ToolConfigError::CommandNotString)?
                .to_string();
        }

        if let Some(args) = tool.get(&key("args")) {
            self.args = args
                .as_sequence()
                .ok_or(ToolConfigError::ArgsNotStrings)?
                .iter()
                .map(|arg| arg.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or(ToolConfigError::ArgsNotStrings)?;
        }

        Ok(())
    }

    fn parse_workers(value: &Yaml) -> Result<NonZeroUsize, ToolConfigError> {
        if let Yaml::Value(Scalar::Integer(n)) = value {
            if let Some(workers) = usize::try_from(*n).ok().and_then(NonZeroUsize::new) {
                return Ok(workers);
            }
        }
        InvalidWorkersSnafu {
            value: format!("{value:?}"),
        }
        .fail()
    }
}

impl TryFrom<&str> for ToolConfig {
    type Error = ToolConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let mut config = Self::default();

        let Some(document) = documents.first() else {
            return Ok(config);
        };

        let top_level = document
            .as_mapping()
            .ok_or(ToolConfigError::TopLevelNotMap)?;

        if let Some(tool) = top_level.get(&key("tool")) {
            let tool = tool.as_mapping().ok_or(ToolConfigError::ToolNotMap)?;
            config.apply_tool_section(tool)?;
        }

        if let Some(workers) = top_level.get(&key("workers")) {
            config.workers = Some(Self::parse_workers(workers)?);
        }

        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum ToolConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file is not valid UTF-8: {}", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("The 'tool' section should be a map"))]
    ToolNotMap,
    #[snafu(display("'tool.command' should be a string"))]
    CommandNotString,
    #[snafu(display("'tool.args' should be a list of strings"))]
    ArgsNotStrings,
    #[snafu(display("'workers' should be a positive integer, got {}", value))]
    InvalidWorkersError { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn parse(yaml: &str) -> Result<ToolConfig, ToolConfigError> {
        yaml.try_into()
    }

    #[test]
    fn defaults_invoke_journal_changelog() {
        let config = ToolConfig::default();
        assert_eq!(config.command, "SpiderOak");
        assert_eq!(config.args, vec!["--journal-changelog".to_string()]);
        assert_eq!(config.workers, None);
    }

    #[test]
    fn full_config_overrides_defaults() {
        let config = parse(
            r#"
tool:
  command: /opt/SpiderOakONE/bin/SpiderOakONE
  args: ["--journal-changelog", "--verbose"]
workers: 3
"#,
        )
        .unwrap();

        assert_eq!(config.command, "/opt/SpiderOakONE/bin/SpiderOakONE");
        assert_eq!(config.args, vec!["--journal-changelog", "--verbose"]);
        assert_eq!(config.workers, NonZeroUsize::new(3));
    }

    #[test]
    fn partial_tool_section_keeps_default_args() {
        let config = parse("tool:\n  command: SpiderOakONE").unwrap();
        assert_eq!(config.command, "SpiderOakONE");
        assert_eq!(config.args, ToolConfig::default().args);
    }

    #[rstest]
    #[case("")]
    #[case("other_setting: value")]
    fn missing_sections_use_defaults(#[case] yaml: &str) {
        assert_eq!(parse(yaml).unwrap(), ToolConfig::default());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result = parse("invalid: yaml: content: [unclosed");
        assert!(matches!(result, Err(ToolConfigError::ParseError { .. })));
    }

    #[test]
    fn list_top_level_is_rejected() {
        let result = parse("- item1\n- item2");
        assert!(matches!(result, Err(ToolConfigError::TopLevelNotMap)));
    }

    #[test]
    fn scalar_tool_section_is_rejected() {
        let result = parse("tool: SpiderOak");
        assert!(matches!(result, Err(ToolConfigError::ToolNotMap)));
    }

    #[test]
    fn non_string_command_is_rejected() {
        let result = parse("tool:\n  command: [a, b]");
        assert!(matches!(result, Err(ToolConfigError::CommandNotString)));
    }

    #[rstest]
    #[case("tool:\n  args: --journal-changelog")]
    #[case("tool:\n  args: [\"--journal-changelog\", [nested]]")]
    fn bad_args_are_rejected(#[case] yaml: &str) {
        assert!(matches!(parse(yaml), Err(ToolConfigError::ArgsNotStrings)));
    }

    #[rstest]
    #[case("workers: 0")]
    #[case("workers: -2")]
    #[case("workers: many")]
    fn bad_worker_counts_are_rejected(#[case] yaml: &str) {
        assert!(matches!(
            parse(yaml),
            Err(ToolConfigError::InvalidWorkersError { .. })
        ));
    }

    #[compio::test]
    async fn missing_default_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = ToolConfig::read(temp_dir.path(), None).await.unwrap();
        assert_eq!(config, ToolConfig::default());
    }

    #[compio::test]
    async fn default_file_in_root_is_loaded() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "workers: 2\n").unwrap();

        let config = ToolConfig::read(temp_dir.path(), None).await.unwrap();
        assert_eq!(config.workers, NonZeroUsize::new(2));
    }

    #[compio::test]
    async fn missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result =
            ToolConfig::read(temp_dir.path(), Some(Path::new("/nonexistent/zerosize.yaml"))).await;
        assert!(matches!(result, Err(ToolConfigError::ReadError { .. })));
    }

    #[compio::test]
    async fn explicit_file_is_loaded() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "tool:\n  command: fake-tool").expect("Failed to write config");

        let config = ToolConfig::read(Path::new("."), Some(temp_file.path()))
            .await
            .unwrap();
        assert_eq!(config.command, "fake-tool");
    }
}
