use clap::{Args as ClapArgs, Parser, Subcommand};

use stepup_setup::install::SetupFlags;

#[derive(Parser, Debug)]
#[command(version, about = "StepUp ADFS plugin setup")]
pub struct Args {
    #[command(subcommand)]
    pub sub: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Run the selected setup phases (exit code = status of the run)
    Run {
        #[command(flatten)]
        phases: PhaseArgs,

        /// Path to configuration file
        #[arg(long, short = 'c')]
        config: Option<String>,
    },
    /// List the operator visible settings
    Settings,
}

/// Phase switches; they always execute in the fixed phase order
#[derive(ClapArgs, Debug, Default)]
pub struct PhaseArgs {
    /// Validate the current installation without writing anything
    #[arg(long)]
    pub check: bool,
    /// Save the host artifacts and the store sub-tree
    #[arg(long)]
    pub backup: bool,
    /// Extract and reconcile the current configuration
    #[arg(long)]
    pub reconfigure: bool,
    /// Repair known-bad store states
    #[arg(long)]
    pub fix: bool,
    /// Remove the installed release
    #[arg(long)]
    pub uninstall: bool,
    /// Install the target release
    #[arg(long)]
    pub install: bool,
}

impl PhaseArgs {
    pub fn flags(&self) -> SetupFlags {
        [
            (self.check, SetupFlags::CHECK),
            (self.backup, SetupFlags::BACKUP),
            (self.reconfigure, SetupFlags::RECONFIGURE),
            (self.fix, SetupFlags::FIX),
            (self.uninstall, SetupFlags::UNINSTALL),
            (self.install, SetupFlags::INSTALL),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(SetupFlags::NONE, |acc, (_, flag)| acc | flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_become_flags() {
        let args = Args::parse_from(["stepup-setup", "run", "--install", "--check", "-c", "x.toml"]);
        match args.sub {
            Cmd::Run { phases, config } => {
                assert_eq!(phases.flags(), SetupFlags::CHECK | SetupFlags::INSTALL);
                assert_eq!(config.as_deref(), Some("x.toml"));
            }
            Cmd::Settings => panic!("expected run"),
        }
    }
}
