/// eng
/// Importers turn the result files of the external simulation tools into kinetic trajectories.
/// Every importer produces a `Trajectory` through `Trajectory::from_rows`, so the shape and
/// species name checks of the trajectory apply to imported data as well.
/// 1) IDSimF reaction simulation (RS) concentration files (`;` separated, one comment line)
/// 2) delimited concentration tables of the reactor simulator and other tools (`,`, tab or
///    whitespace separated)
/// 3) OpenFOAM solver logs with chemical concentration lines
pub mod import_error;
pub mod idsimf_rs;
pub mod delimited;
pub mod openfoam_log;
/// choice of the file format and the dispatcher over the importers
pub mod import_format;
