/// command line front end: argument parsing, logger set up and the subcommands
/// `summary`, `query`, `equilibrium` and `batch`
pub mod cli_main;
/// batch analysis of simulation result files: equilibrium check and cluster abundance reports
pub mod batch;
