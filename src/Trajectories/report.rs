use super::indexing::SpeciesTable;
use super::trajectory::Trajectory;
use prettytable::{Cell, Row, Table, row};

impl Trajectory {
    ////////////////////////INPUT/OUTPUT////////////////////////////////////////////////////////

    /// Summary table: species, number of samples, time range, units and run attributes
    pub fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["property", "value"]);
        table.add_row(row!["species", self.species_names.join(", ")]);
        table.add_row(row!["time steps", self.number_of_timesteps()]);
        if let (Some(first), Some(last)) = (self.times.first(), self.times.last()) {
            table.add_row(row!["time range", format!("{:e} .. {:e}", first, last)]);
        }
        table.add_row(row!["time scaling factor", self.time_scaling_factor]);
        table.add_row(row!["concentration unit", self.concentration_unit]);
        let mut keys: Vec<&String> = self.attributes.keys().collect();
        keys.sort();
        for key in keys {
            table.add_row(row![format!("attribute {}", key), self.attributes[key]]);
        }
        table
    }

    /// Prints the trajectory summary to the console
    pub fn pretty_print(&self) {
        println!("__________kinetic trajectory__________");
        self.summary_table().printstd();
        println!("_____________________________________________________________");
    }
}

impl<'a> SpeciesTable<'a> {
    /// One row per time step, one column per species
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        let mut header_row = vec![Cell::new("Time")];
        for name in self.species_names() {
            header_row.push(Cell::new(name));
        }
        table.add_row(Row::new(header_row));
        for (i, t) in self.times().iter().enumerate() {
            let mut row = vec![Cell::new(&format!("{:e}", t))];
            for (_, series) in self.iter() {
                row.push(Cell::new(&format!("{:.6e}", series[i])));
            }
            table.add_row(Row::new(row));
        }
        table
    }

    pub fn pretty_print(&self) {
        self.to_table().printstd();
    }
}
