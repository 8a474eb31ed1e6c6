#[allow(non_snake_case)]
pub mod Analysis;
#[allow(non_snake_case)]
pub mod Importers;
#[allow(non_snake_case)]
pub mod Trajectories;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod settings;
