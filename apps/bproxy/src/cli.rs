use clap::Parser;

#[derive(Parser)]
#[command(name = "bproxy")]
pub(crate) struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short = 'c', long, default_value = "config.json")]
    pub(crate) config: String,
}
