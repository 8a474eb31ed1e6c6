/// eng
/// Kinetic trajectory: the uniform in-memory representation of one kinetics simulation run.
/// A trajectory holds an ordered list of species, the recorded time stamps and a dense
/// concentration matrix (one row per time step, one column per species) plus run metadata.
/// Construction validates the shape once; afterwards the trajectory is read only.
pub mod trajectory;
/// Positional access (rows, cells, column ranges), label access by species name
/// (series, values, slices, restricted tables, lookups by recorded time) and the
/// `Selector` tagged variant that parses textual queries and dispatches to the accessors.
pub mod indexing;
/// console tables for trajectories and species tables
pub mod report;
