// duplexcom - Interactive serial terminal
use anyhow::Context;
use clap::Parser;
use duplexcom::{
    cli::Args,
    infrastructure::{config::ConfigLoader, logging::init_logging},
    App,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, overrides) = args.to_config().context("Failed to build configuration")?;
    init_logging(args.trace.as_deref()).context("Failed to set up diagnostics")?;
    ConfigLoader::new(overrides)
        .load(&mut config)
        .context("Failed to load config file")?;

    let serial_path = config.serial_path.clone();
    let reason = App::new(config)
        .run()
        .with_context(|| format!("Failed to run session on {}", serial_path))?;

    match reason.exit_code() {
        0 => Ok(()),
        code => {
            eprintln!("duplexcom: {}", reason);
            std::process::exit(code);
        }
    }
}
