//! Interactive dashboard session.
//!
//! Reads one command per line, updates the [`Selection`] and rebuilds the
//! dashboard from the immutable table after every change.

use crate::dashboard::{build_dashboard, DashboardOptions, Selection};
use crate::dataset::InspectionTable;
use crate::report::generate_markdown_report;
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  vehicle <ID>   select the vehicle shown in the coverage heatmap
  vehicles       list selectable vehicle IDs
  raw            toggle the raw data table
  missing        toggle the missing value counts
  most           toggle the most frequently detected parts
  least          toggle the least frequently detected parts
  show           render the dashboard again
  help           show this help
  quit | exit    end the session";

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Vehicle(String),
    ListVehicles,
    ToggleRaw,
    ToggleMissing,
    ToggleMostFrequent,
    ToggleLeastFrequent,
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Command::Empty,
            "vehicle" if !rest.is_empty() => Command::Vehicle(rest.to_string()),
            "vehicles" => Command::ListVehicles,
            "raw" => Command::ToggleRaw,
            "missing" => Command::ToggleMissing,
            "most" => Command::ToggleMostFrequent,
            "least" => Command::ToggleLeastFrequent,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// State of one interactive session.
pub struct Session<'a> {
    table: &'a InspectionTable,
    options: DashboardOptions,
    selection: Selection,
}

impl<'a> Session<'a> {
    pub fn new(
        table: &'a InspectionTable,
        options: DashboardOptions,
        selection: Selection,
    ) -> Self {
        Self {
            table,
            options,
            selection,
        }
    }

    /// Current selection.
    #[cfg(test)]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Apply a command to the selection.
    ///
    /// Returns `true` if the dashboard has to be rendered again.
    pub fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::Vehicle(id) => {
                self.selection.vehicle_id = Some(id.clone());
                true
            }
            Command::ToggleRaw => toggle(&mut self.selection.show_raw),
            Command::ToggleMissing => toggle(&mut self.selection.show_missing),
            Command::ToggleMostFrequent => toggle(&mut self.selection.show_most_frequent),
            Command::ToggleLeastFrequent => toggle(&mut self.selection.show_least_frequent),
            Command::Show => true,
            _ => false,
        }
    }

    /// Render the dashboard for the current selection.
    pub fn render(&self) -> String {
        generate_markdown_report(&build_dashboard(self.table, &self.selection, &self.options))
    }

    /// Run the session until `quit` or end of input.
    ///
    /// Returns the number of times the dashboard was rendered.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<usize> {
        info!("Interactive session started");

        writeln!(output, "{}", self.render())?;
        let mut renders = 1;
        writeln!(output, "Type 'help' for commands.")?;

        for line in input.lines() {
            let command = Command::parse(&line?);
            debug!("Command: {:?}", command);

            match command {
                Command::Quit => break,
                Command::Empty => continue,
                Command::Help => writeln!(output, "{}", HELP)?,
                Command::ListVehicles => {
                    let vehicles = self.table.vehicle_ids();
                    if vehicles.is_empty() {
                        writeln!(output, "No vehicles in dataset.")?;
                    } else {
                        writeln!(output, "{}", vehicles.join("\n"))?;
                    }
                }
                Command::Unknown(ref text) => {
                    writeln!(output, "Unknown command: {} (type 'help')", text)?;
                }
                _ => {
                    if self.apply(&command) {
                        writeln!(output, "{}", self.render())?;
                        renders += 1;
                    }
                }
            }
            output.flush()?;
        }

        info!("Interactive session ended after {} renders", renders);
        Ok(renders)
    }
}

fn toggle(flag: &mut bool) -> bool {
    *flag = !*flag;
    true
}
