use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{CompletionsCommand, UrlCommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "fedsignin", version, about = "Generate a temporary, policy-restricted AWS console sign-in URL", long_about = None, arg_required_else_help = false)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        help = "Local AWS profile to federate from (default: ambient credentials)"
    )]
    pub profile: Option<String>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Print a console sign-in URL (default)")]
    Url(UrlCommand),
    #[command(about = "Generate shell completion scripts for fedsignin")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let profile = self.profile;
        let command = self
            .command
            .unwrap_or_else(|| Commands::Url(UrlCommand::default()));

        match command {
            Commands::Url(cmd) => cmd.execute(profile.as_deref()).await,
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}
