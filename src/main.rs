use KiTra::cli::cli_main::{Cli, init_logger, run};
use clap::Parser;
use log::error;

pub fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
