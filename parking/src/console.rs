use crate::clock::Clock;
use crate::error::{Error, InputError, ParkingError};
use crate::manager::ParkingManager;
use crate::models::Vehicle;
use crate::parser::parse_ticket_id;
use std::io::{BufRead, Write};
use tracing::debug;

const CURRENCY: &str = "\u{20B9}";

/// Menu-driven adapter around a [`ParkingManager`] for a person at a terminal.
pub struct Console<C: Clock, R, W> {
    manager: ParkingManager<C>,
    input: R,
    output: W,
}
impl<C: Clock, R: BufRead, W: Write> Console<C, R, W> {
    pub fn new(manager: ParkingManager<C>, input: R, output: W) -> Self {
        Self { manager, input, output }
    }

    pub fn run(&mut self) -> Result<(), Error> {
        writeln!(self.output, "Welcome to Parking Lot System (Console Version)")?;
        'menu: loop {
            writeln!(self.output, "\nChoose an option:")?;
            writeln!(self.output, "1. Park Vehicle")?;
            writeln!(self.output, "2. Exit Vehicle")?;
            writeln!(self.output, "3. Quit")?;

            let Some(choice) = self.prompt("Enter choice: ")? else {
                break 'menu;
            };
            match choice.as_str() {
                "1" => self.park()?,
                "2" => self.exit()?,
                "3" => break 'menu,
                _ => writeln!(self.output, "Invalid choice. Try again.")?,
            }
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    pub fn into_parts(self) -> (ParkingManager<C>, W) {
        (self.manager, self.output)
    }

    /// Reads one trimmed line; `None` once the input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<Option<String>, Error> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn park(&mut self) -> Result<(), Error> {
        let Some(plate) = self.prompt("Enter Plate Number: ")? else {
            return Ok(());
        };
        if plate.is_empty() {
            writeln!(self.output, "Plate number cannot be empty.")?;
            return Ok(());
        }
        let Some(category) = self.prompt("Enter Vehicle Type (CAR/BIKE): ")? else {
            return Ok(());
        };

        let vehicle = match Vehicle::parse(&plate, &category) {
            Ok(vehicle) => vehicle,
            Err(InputError::EmptyPlate) => {
                writeln!(self.output, "Plate number cannot be empty.")?;
                return Ok(());
            },
            Err(error) => {
                debug!("Rejected vehicle: {error}");
                writeln!(self.output, "Invalid vehicle type. Only CAR or BIKE allowed.")?;
                return Ok(());
            },
        };

        match self.manager.park(vehicle) {
            Ok(ticket) => writeln!(self.output, "Vehicle parked successfully. Your Ticket ID: {}", ticket.id())?,
            Err(_) => writeln!(self.output, "Sorry, no available spot for this vehicle type.")?,
        }
        Ok(())
    }

    fn exit(&mut self) -> Result<(), Error> {
        let Some(raw) = self.prompt("Enter Ticket ID: ")? else {
            return Ok(());
        };
        let ticket = match parse_ticket_id(&raw) {
            Ok(ticket) => ticket,
            Err(_) => {
                writeln!(self.output, "Invalid input. Please enter a numeric Ticket ID.")?;
                return Ok(());
            },
        };

        match self.manager.exit(ticket) {
            Ok(fee) => writeln!(self.output, "Vehicle exited. Fee: {CURRENCY}{fee}")?,
            Err(ParkingError::InvalidTicket(_)) => writeln!(self.output, "Invalid Ticket ID.")?,
            Err(error) => writeln!(self.output, "{error}")?,
        }
        Ok(())
    }
}
