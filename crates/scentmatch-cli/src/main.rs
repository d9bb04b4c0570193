use clap::Parser;
use scentmatch_cli::{CliArgs, Command, ScentCli, ScentConfig};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // Config subcommands read the file themselves and must work when it is broken.
    let cli = match args.command {
        Some(Command::Config(_)) => Ok(ScentCli::new("scentmatch", ScentConfig::default())),
        _ => ScentCli::from_args("scentmatch", &args),
    };
    let result = match cli {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
