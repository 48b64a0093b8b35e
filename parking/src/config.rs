use crate::error::Error;
use crate::manager::ParkingManager;
use crate::models::{ParkingSpot, VehicleCategory};
use clap::{Args, Parser, Subcommand};
use common::DEFAULT_PORT;

#[derive(Debug, Parser)]
#[command(name = "parking")]
#[command(about = "Parking facility: first-fit spot allocation with hourly fees", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the line protocol over TCP
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PARKING_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        #[command(flatten)]
        layout: Layout,
    },

    /// Interactive menu on stdin/stdout
    Console {
        #[command(flatten)]
        layout: Layout,
    },
}

#[derive(Debug, Clone, Args)]
pub struct Layout {
    /// Spot categories in scan order, e.g. CAR,BIKE,CAR,BIKE; spots are numbered from 1
    #[arg(
        long = "layout",
        env = "PARKING_LAYOUT",
        value_delimiter = ',',
        default_values_t = vec![VehicleCategory::Car, VehicleCategory::Bike, VehicleCategory::Car, VehicleCategory::Bike]
    )]
    pub categories: Vec<VehicleCategory>,
}
impl Layout {
    pub fn spots(&self) -> Vec<ParkingSpot> {
        ParkingManager::layout(&self.categories)
    }

    pub fn manager(&self) -> Result<ParkingManager, Error> {
        Ok(ParkingManager::new(self.spots())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["parking", "serve"]).expect("Defaults parse.");
        let Command::Serve { port, layout } = cli.command else {
            panic!("Expected the serve command.");
        };
        assert_eq!(DEFAULT_PORT, port);
        assert_eq!(ParkingManager::default_layout(), layout.spots());
    }

    #[test]
    fn test_custom_layout() {
        let cli = Cli::try_parse_from(["parking", "console", "--layout", "bike,Car"]).expect("Layout parses.");
        let Command::Console { layout } = cli.command else {
            panic!("Expected the console command.");
        };
        assert_eq!(vec![VehicleCategory::Bike, VehicleCategory::Car], layout.categories);
        let manager = layout.manager().expect("Valid layout.");
        assert_eq!(2, manager.spots()[1].id());
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!(Cli::try_parse_from(["parking", "serve", "--layout", "CAR,TRUCK"]).is_err());
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
