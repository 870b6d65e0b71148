use clap::Parser;
use replik::config::{Cli, Command};
use replik::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Copy { .. } => {
            let config = Config::from(cli.command);
            config.validate()?;
            replik::commands::copy::run(&config)?;
        }
        Command::Verify { .. } => {
            let config = Config::from(cli.command);
            config.validate_verify()?;
            let identical = replik::commands::verify::run(&config)?;
            if !identical {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
