use clap::Subcommand;
use procheck_core::{storage, Config};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the data directory path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", config.to_toml());
        }
        ConfigAction::Path => {
            println!("{}", storage::data_dir()?.display());
        }
    }
    Ok(())
}
