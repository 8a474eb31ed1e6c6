/// eng
/// Final equilibrium (steady) state of a kinetic trajectory. The equilibrium state is the average
/// concentration of every species over the trailing time steps of the trajectory. It is accepted
/// only if the relative spread (max - min) / mean of every species in that window stays below a
/// tolerance, otherwise the whole calculation fails: no partial or approximate result is returned.
/// The module also serializes the equilibrium state into the comma separated `name:value`
/// initial-condition string understood by the kinetics solver.
pub mod equilibrium;
/// Cluster abundance statistics of ion cluster simulations (mean cluster size, weighted mean
/// mobility) and separation of FAIMS/DMS field phases.
pub mod clusters;
#[cfg(test)]
mod equilibrium_tests;
