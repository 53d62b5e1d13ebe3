mod changelog_command;

pub use changelog_command::ChangelogCommand;
