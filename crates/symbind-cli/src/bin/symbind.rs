use clap::Parser;
use symbind_cli::args::CliArgs;
use symbind_cli::{driver, tracing_config};

fn main() {
    let args = CliArgs::parse();
    tracing_config::init(args.verbose);

    if let Err(err) = driver::run(&args) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
