use crate::commands::{
    run_rules, run_score, run_suitability, RulesArgs, ScoreArgs, SuitabilityArgs,
};
use clap::{Parser, Subcommand};
use menu_diet::config::AppConfig;
use menu_diet::error::AppError;
use menu_diet::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "menu-diet",
    about = "Score restaurant menus for diet suitability and resolve manual overrides",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every diet tag against a restaurant snapshot and print the results as JSON
    Score(ScoreArgs),
    /// Compute, store, and resolve effective suitability for a restaurant snapshot
    Suitability(SuitabilityArgs),
    /// Print the merged rule set for a diet tag key
    Rules(RulesArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Score(args) => run_score(args, &config),
        Command::Suitability(args) => run_suitability(args, &config),
        Command::Rules(args) => run_rules(args),
    }
}
