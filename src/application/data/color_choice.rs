use clap::ValueEnum;
use supports_color::Stream;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Decides whether stdout gets colored and configures `colored` to match.
    pub fn apply_to_stdout(&self) -> bool {
        let enabled = match self {
            ColorChoice::Auto => supports_color::on(Stream::Stdout).is_some(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        colored::control::set_override(enabled);
        enabled
    }
}
