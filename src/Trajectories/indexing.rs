//! # Trajectory Indexing
//!
//! Two independent access protocols exist on a `Trajectory`:
//!
//! - **positional access** by integer time position and species column:
//!   `row(i)`, `value(i, j)`, `column_range(a..b, j)`
//! - **label access** by species name: `series_for(name)`, `value_at(name, i)`,
//!   `slice_for(name, a..b)`, `table_for(names)`, `table_slice_for(names, a..b)` and
//!   `value_at_time(name, t, lookup)` addressing a sample by its recorded time value
//!
//! Every accessor hands out views into the backing matrix; nothing is copied.
//!
//! `Selector` is the textual front end of both protocols (used by the command line):
//!
//! | text            | meaning                                        |
//! |-----------------|------------------------------------------------|
//! | `3`             | full row at time position 3                    |
//! | `3,1`           | value at time position 3, species column 1     |
//! | `2:5,1`         | species column 1 over time positions 2..5      |
//! | `H2O`           | full series of H2O                             |
//! | `H2O,2`         | H2O at time position 2                         |
//! | `H2O,2:5`       | H2O over time positions 2..5                   |
//! | `[A,B]`         | table of A and B                               |
//! | `[A,B],1:3`     | table of A and B over time positions 1..3      |
//! | `[A,B],4`       | table of A and B at time position 4           |
//! | `H2O@5.0`       | H2O at the recorded time nearest to 5.0        |
//! | `H2O@=5.0`      | H2O at the recorded time exactly 5.0           |
//!
//! Keys made only of digits are always positional: positional access never accepts species
//! names and label access never accepts column numbers.
use super::trajectory::{Trajectory, TrajectoryError};
use nalgebra::{Dyn, MatrixView, U1};
use std::collections::HashMap;
use std::ops::Range;
use std::str::FromStr;

/// Borrowed row of the concentration matrix
pub type RowView<'a> = MatrixView<'a, f64, U1, Dyn, U1, Dyn>;

/// How a literal time value is matched against the recorded time stamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLookup {
    /// the time value must be one of the recorded time stamps
    Exact,
    /// the closest recorded time stamp, the earliest one on ties
    Nearest,
}

/// Borrowed table of species time series restricted over species and time positions.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesTable<'a> {
    times: &'a [f64],
    columns: Vec<(&'a str, &'a [f64])>,
}

impl<'a> SpeciesTable<'a> {
    pub fn species_names(&self) -> Vec<&'a str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    /// time stamps of the table rows
    pub fn times(&self) -> &'a [f64] {
        self.times
    }

    pub fn series(&self, name: &str) -> Option<&'a [f64]> {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, series)| *series)
    }

    pub fn number_of_species(&self) -> usize {
        self.columns.len()
    }

    pub fn number_of_timesteps(&self) -> usize {
        self.times.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a [f64])> + '_ {
        self.columns.iter().copied()
    }

    pub fn to_map(&self) -> HashMap<String, Vec<f64>> {
        self.columns
            .iter()
            .map(|(name, series)| (name.to_string(), series.to_vec()))
            .collect()
    }
}

/// Tagged form of every supported access mode
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Row(usize),
    Cell(usize, usize),
    ColumnRange(Range<usize>, usize),
    Series(String),
    SeriesValue(String, usize),
    SeriesSlice(String, Range<usize>),
    SeriesAtTime(String, f64, TimeLookup),
    Table(Vec<String>),
    TableSlice(Vec<String>, Range<usize>),
}

/// Result of a `Selector` dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    Row(RowView<'a>),
    Value(f64),
    /// values starting at the given time position
    Series(usize, &'a [f64]),
    Table(SpeciesTable<'a>),
}

impl Trajectory {
    ///////////////////////////POSITIONAL ACCESS//////////////////////////////////////////

    /// Full row of concentrations at time position `i`
    pub fn row(&self, i: usize) -> Result<RowView<'_>, TrajectoryError> {
        self.check_position(i)?;
        Ok(self.data.row(i))
    }

    /// Concentration at time position `i` of the species in column `j`
    pub fn value(&self, i: usize, j: usize) -> Result<f64, TrajectoryError> {
        self.check_position(i)?;
        self.check_column(j)?;
        Ok(self.data[(i, j)])
    }

    /// Concentrations of the species in column `j` over the time positions `range`
    pub fn column_range(&self, range: Range<usize>, j: usize) -> Result<&[f64], TrajectoryError> {
        self.check_column(j)?;
        self.check_range(&range)?;
        Ok(&self.column_data(j)[range])
    }

    /// Full time series of the species in column `j`
    pub fn column(&self, j: usize) -> Result<&[f64], TrajectoryError> {
        self.check_column(j)?;
        Ok(self.column_data(j))
    }

    /// column `j` must be a valid species column
    pub(crate) fn column_data(&self, j: usize) -> &[f64] {
        let n = self.number_of_timesteps();
        &self.data.as_slice()[j * n..(j + 1) * n]
    }

    ///////////////////////////LABEL ACCESS///////////////////////////////////////////////

    /// Full time series of a species
    pub fn series_for(&self, name: &str) -> Result<&[f64], TrajectoryError> {
        let j = self.species_index(name)?;
        Ok(self.column_data(j))
    }

    /// Concentration of a species at time position `i`
    pub fn value_at(&self, name: &str, i: usize) -> Result<f64, TrajectoryError> {
        let j = self.species_index(name)?;
        self.value(i, j)
    }

    /// Concentrations of a species over the time positions `range`
    pub fn slice_for(&self, name: &str, range: Range<usize>) -> Result<&[f64], TrajectoryError> {
        let j = self.species_index(name)?;
        self.column_range(range, j)
    }

    /// Time series of the given species
    pub fn table_for<S: AsRef<str>>(&self, names: &[S]) -> Result<SpeciesTable<'_>, TrajectoryError> {
        self.table_slice_for(names, 0..self.number_of_timesteps())
    }

    /// Time series of the given species restricted to the time positions `range`
    pub fn table_slice_for<S: AsRef<str>>(
        &self,
        names: &[S],
        range: Range<usize>,
    ) -> Result<SpeciesTable<'_>, TrajectoryError> {
        self.check_range(&range)?;
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let j = self.species_index(name.as_ref())?;
            columns.push((self.species_names[j].as_str(), &self.column_data(j)[range.clone()]));
        }
        Ok(SpeciesTable {
            times: &self.times[range],
            columns,
        })
    }

    /// Concentration of a species at a literal recorded time value
    pub fn value_at_time(&self, name: &str, t: f64, lookup: TimeLookup) -> Result<f64, TrajectoryError> {
        let j = self.species_index(name)?;
        let i = self.time_position(t, lookup)?;
        Ok(self.data[(i, j)])
    }

    /// Time position of a literal time value
    pub fn time_position(&self, t: f64, lookup: TimeLookup) -> Result<usize, TrajectoryError> {
        if t.is_nan() {
            return Err(TrajectoryError::InvalidIndex("time value is NaN".to_string()));
        }
        let found = match lookup {
            TimeLookup::Exact => self.times.iter().position(|&x| x == t),
            TimeLookup::Nearest => {
                let mut best: Option<(usize, f64)> = None;
                for (i, &x) in self.times.iter().enumerate() {
                    let distance = (x - t).abs();
                    match best {
                        Some((_, d)) if d <= distance => {}
                        _ => best = Some((i, distance)),
                    }
                }
                best.map(|(i, _)| i)
            }
        };
        found.ok_or_else(|| {
            TrajectoryError::InvalidIndex(format!("time {} is not a recorded time of the trajectory", t))
        })
    }

    ///////////////////////////SELECTOR DISPATCH//////////////////////////////////////////

    pub fn select(&self, selector: &Selector) -> Result<Selection<'_>, TrajectoryError> {
        match selector {
            Selector::Row(i) => self.row(*i).map(Selection::Row),
            Selector::Cell(i, j) => self.value(*i, *j).map(Selection::Value),
            Selector::ColumnRange(range, j) => self
                .column_range(range.clone(), *j)
                .map(|values| Selection::Series(range.start, values)),
            Selector::Series(name) => self.series_for(name).map(|values| Selection::Series(0, values)),
            Selector::SeriesValue(name, i) => self.value_at(name, *i).map(Selection::Value),
            Selector::SeriesSlice(name, range) => {
                self.slice_for(name, range.clone())
                    .map(|values| Selection::Series(range.start, values))
            }
            Selector::SeriesAtTime(name, t, lookup) => {
                self.value_at_time(name, *t, *lookup).map(Selection::Value)
            }
            Selector::Table(names) => self.table_for(names.as_slice()).map(Selection::Table),
            Selector::TableSlice(names, range) => {
                self.table_slice_for(names.as_slice(), range.clone())
                    .map(Selection::Table)
            }
        }
    }

    fn check_position(&self, i: usize) -> Result<(), TrajectoryError> {
        if i >= self.number_of_timesteps() {
            return Err(TrajectoryError::InvalidIndex(format!(
                "time position {} out of range for {} time steps",
                i,
                self.number_of_timesteps()
            )));
        }
        Ok(())
    }

    fn check_column(&self, j: usize) -> Result<(), TrajectoryError> {
        if j >= self.number_of_species() {
            return Err(TrajectoryError::InvalidIndex(format!(
                "species column {} out of range for {} species",
                j,
                self.number_of_species()
            )));
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), TrajectoryError> {
        if range.start > range.end || range.end > self.number_of_timesteps() {
            return Err(TrajectoryError::InvalidIndex(format!(
                "time range {}:{} out of range for {} time steps",
                range.start,
                range.end,
                self.number_of_timesteps()
            )));
        }
        Ok(())
    }
}

///////////////////////////SELECTOR PARSING///////////////////////////////////////////////

enum TimeKey {
    Position(usize),
    Range(Range<usize>),
}

impl TimeKey {
    fn into_range(self) -> Result<Range<usize>, TrajectoryError> {
        match self {
            TimeKey::Position(i) => {
                let end = i
                    .checked_add(1)
                    .ok_or_else(|| invalid(format!("time position {} is too large", i)))?;
                Ok(i..end)
            }
            TimeKey::Range(r) => Ok(r),
        }
    }
}

fn invalid(msg: String) -> TrajectoryError {
    TrajectoryError::InvalidIndex(msg)
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_digit() || c == ':')
}

fn parse_position(key: &str) -> Result<usize, TrajectoryError> {
    key.parse::<usize>()
        .map_err(|_| invalid(format!("'{}' is not a time position", key)))
}

fn parse_time_key(key: &str) -> Result<TimeKey, TrajectoryError> {
    match key.split_once(':') {
        Some((start, end)) => {
            let start = parse_position(start.trim())?;
            let end = parse_position(end.trim())?;
            Ok(TimeKey::Range(start..end))
        }
        None => Ok(TimeKey::Position(parse_position(key)?)),
    }
}

fn parse_species_list(list: &str) -> Result<Vec<String>, TrajectoryError> {
    let names: Vec<String> = list
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        return Err(invalid("empty species list".to_string()));
    }
    Ok(names)
}

impl FromStr for Selector {
    type Err = TrajectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(invalid("empty selector".to_string()));
        }

        // list of species, optionally followed by a time key
        if let Some(rest) = s.strip_prefix('[') {
            let (list, tail) = rest
                .split_once(']')
                .ok_or_else(|| invalid(format!("unterminated species list in '{}'", s)))?;
            let names = parse_species_list(list)?;
            let tail = tail.trim();
            if tail.is_empty() {
                return Ok(Selector::Table(names));
            }
            let time_key = tail
                .strip_prefix(',')
                .ok_or_else(|| invalid(format!("unexpected '{}' after species list", tail)))?;
            let range = parse_time_key(time_key.trim())?.into_range()?;
            return Ok(Selector::TableSlice(names, range));
        }

        // species at a literal time value
        if let Some((name, time)) = s.split_once('@') {
            let name = name.trim();
            if name.is_empty() || is_numeric_key(name) {
                return Err(invalid(format!("'{}' is not a species name", name)));
            }
            let (time, lookup) = match time.strip_prefix('=') {
                Some(t) => (t, TimeLookup::Exact),
                None => (time, TimeLookup::Nearest),
            };
            let t: f64 = time
                .trim()
                .parse()
                .map_err(|_| invalid(format!("'{}' is not a time value", time.trim())))?;
            return Ok(Selector::SeriesAtTime(name.to_string(), t, lookup));
        }

        let (key, rest) = match s.split_once(',') {
            Some((k, r)) => (k.trim(), Some(r.trim())),
            None => (s, None),
        };

        if is_numeric_key(key) {
            // positional access
            match (parse_time_key(key)?, rest) {
                (TimeKey::Position(i), None) => Ok(Selector::Row(i)),
                (TimeKey::Position(i), Some(col)) => {
                    let j = col.parse::<usize>().map_err(|_| {
                        invalid(format!(
                            "positional access needs a numeric species column, got '{}'",
                            col
                        ))
                    })?;
                    Ok(Selector::Cell(i, j))
                }
                (TimeKey::Range(range), Some(col)) => {
                    let j = col.parse::<usize>().map_err(|_| {
                        invalid(format!(
                            "positional access needs a numeric species column, got '{}'",
                            col
                        ))
                    })?;
                    Ok(Selector::ColumnRange(range, j))
                }
                (TimeKey::Range(_), None) => Err(invalid(format!(
                    "time range '{}' needs a species column",
                    key
                ))),
            }
        } else {
            // label access
            let name = key.to_string();
            match rest {
                None => Ok(Selector::Series(name)),
                Some(time_key) => match parse_time_key(time_key)? {
                    TimeKey::Position(i) => Ok(Selector::SeriesValue(name, i)),
                    TimeKey::Range(range) => Ok(Selector::SeriesSlice(name, range)),
                },
            }
        }
    }
}
