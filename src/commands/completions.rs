use std::io::{self, Write};

use clap::{Args, CommandFactory};
use clap_complete::Shell;

use crate::cli::Cli;

#[derive(Debug, Clone, Args)]
pub struct CompletionsCommand {
    #[arg(value_enum, help = "Target shell for completion script")]
    pub shell: Shell,
}

impl CompletionsCommand {
    pub fn execute(self) {
        self.write_to(&mut io::stdout().lock());
    }

    /// Render the completion script for the whole `fedsignin` command tree
    pub fn write_to<W: Write>(&self, out: &mut W) {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, bin_name, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    fn script(shell: Shell) -> String {
        let mut buffer = Vec::new();
        CompletionsCommand { shell }.write_to(&mut buffer);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_every_shell_offers_url_flags() {
        for shell in Shell::value_variants() {
            let result = script(*shell);
            for flag in [
                "profile",
                "policy-file",
                "destination",
                "duration",
                "user-name",
                "strategy",
                "role-arn",
                "region",
                "endpoint",
                "open",
            ] {
                assert!(
                    result.contains(flag),
                    "{flag} should be in {shell} completions"
                );
            }
        }
    }

    #[test]
    fn test_strategy_values_are_completed() {
        for shell in [Shell::Bash, Shell::Fish, Shell::Zsh] {
            let result = script(shell);
            assert!(
                result.contains("federation") && result.contains("assume-role"),
                "strategy values should be in {shell} completions"
            );
        }
    }

    #[test]
    fn test_subcommands_are_completed() {
        let result = script(Shell::Bash);
        assert!(result.contains("url"));
        assert!(result.contains("completions"));
    }
}
