use crate::clock::{Clock, SystemClock};
use crate::handles;
use crate::io::{ClientInput, Message, ServerOutput};
use crate::manager::ParkingManager;
use crate::models::VehicleCategory;
use crate::parser::Request;
use std::collections::HashMap;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Single owner of the [`ParkingManager`] behind the TCP service.
///
/// Connection threads only parse; every request is funnelled through one channel and applied
/// here in arrival order, so a first-fit scan and the mutation that follows it can never
/// interleave with another client's request.
pub struct Application<C: Clock = SystemClock> {
    manager: ParkingManager<C>,
    connections: HashMap<Uuid, TcpStream>,
}
impl<C: Clock> Application<C> {
    pub fn new(manager: ParkingManager<C>) -> Self {
        Self {
            manager,
            connections: HashMap::new(),
        }
    }

    pub fn run(mut self, listener: TcpListener) -> ! {
        let (conn_tx, conn_rx) = mpsc::channel::<Message>();
        let acceptor_tx = conn_tx.clone();
        thread::spawn(move || handles::acceptor(listener, acceptor_tx));

        // `conn_tx` outlives the loop, so the channel never reports itself disconnected.
        loop {
            if let Ok(message) = conn_rx.recv() {
                self.handle_message(message);
            }
        }
    }

    pub fn manager(&self) -> &ParkingManager<C> {
        &self.manager
    }

    pub(crate) fn handle_message(&mut self, message: Message) {
        match message.input {
            ClientInput::Connected(stream) => {
                self.connections.insert(message.from, stream);
            },
            ClientInput::Request(Request::Quit) => self.close_connection(&message.from, Some(ServerOutput::Goodbye)),
            ClientInput::Request(request) => {
                debug!("{}: {request:?}", message.from);
                let output = self.serve(request);
                self.respond(&message.from, output);
            },
            ClientInput::Invalid(error) => {
                debug!("{}: rejected input ({error})", message.from);
                self.respond(&message.from, ServerOutput::Invalid(error));
            },
            ClientInput::StreamErrored => {
                warn!("Connection {} errored.", message.from);
                self.close_connection(&message.from, None);
            },
            ClientInput::StreamEnded => self.close_connection(&message.from, None),
        }
    }

    /// Applies one request to the manager and describes the outcome.
    pub fn serve(&mut self, request: Request) -> ServerOutput {
        match request {
            Request::Park(vehicle) => match self.manager.park(vehicle) {
                Ok(ticket) => ServerOutput::Parked {
                    ticket: ticket.id(),
                    spot: ticket.spot(),
                },
                Err(error) => ServerOutput::Refused(error),
            },
            Request::Exit(ticket) => match self.manager.exit(ticket) {
                Ok(fee) => ServerOutput::Exited { ticket, fee },
                Err(error) => ServerOutput::Refused(error),
            },
            Request::Status => ServerOutput::Status(
                VehicleCategory::ALL
                    .into_iter()
                    .map(|category| (category, self.manager.availability(category)))
                    .collect(),
            ),
            Request::Quit => ServerOutput::Goodbye,
        }
    }

    fn respond(&mut self, id: &Uuid, output: ServerOutput) {
        if let Some(stream) = self.connections.get_mut(id) {
            if !output.write(stream) {
                warn!("Shutdown connection {id} due to write error.");
                self.close_connection(id, None);
            }
        }
    }

    pub(crate) fn close_connection(&mut self, id: &Uuid, farewell: Option<ServerOutput>) {
        if let Some(mut stream) = self.connections.remove(id) {
            if let Some(output) = farewell {
                output.write(&mut stream);
            }
            info!("Dropping connection {id}...");
            _ = stream.shutdown(Shutdown::Both);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{InputError, ParkingError};
    use crate::fees::Fee;
    use crate::manager::Availability;
    use crate::models::Vehicle;
    use chrono::Duration;
    use std::sync::Arc;

    fn application() -> (Application<Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let manager = ParkingManager::with_clock(ParkingManager::default_layout(), clock.clone())
            .expect("Valid layout.");
        (Application::new(manager), clock)
    }

    fn park(plate: &str, category: VehicleCategory) -> Request {
        Request::Park(Vehicle::new(plate, category).expect("Valid vehicle."))
    }

    #[test]
    fn test_serve_park_and_exit() {
        let (mut app, clock) = application();
        assert_eq!(
            ServerOutput::Parked { ticket: 1, spot: 1 },
            app.serve(park("KA01AB1234", VehicleCategory::Car))
        );
        assert_eq!(
            ServerOutput::Parked { ticket: 2, spot: 2 },
            app.serve(park("KA02", VehicleCategory::Bike))
        );
        clock.advance(Duration::minutes(61));
        assert_eq!(
            ServerOutput::Exited { ticket: 1, fee: Fee::new(30) },
            app.serve(Request::Exit(1))
        );
        assert_eq!(
            ServerOutput::Refused(ParkingError::InvalidTicket(1)),
            app.serve(Request::Exit(1))
        );
        assert_eq!(1, app.manager().active_count());
    }

    #[test]
    fn test_serve_full() {
        let (mut app, _) = application();
        app.serve(park("B1", VehicleCategory::Bike));
        app.serve(park("B2", VehicleCategory::Bike));
        assert_eq!(
            ServerOutput::Refused(ParkingError::NoSpotAvailable(VehicleCategory::Bike)),
            app.serve(park("B3", VehicleCategory::Bike))
        );
        assert_eq!(
            ServerOutput::Status(vec![
                (VehicleCategory::Car, Availability { free: 2, total: 2 }),
                (VehicleCategory::Bike, Availability { free: 0, total: 2 }),
            ]),
            app.serve(Request::Status)
        );
    }

    #[test]
    fn test_requests_apply_without_a_connection() {
        let (mut app, _) = application();
        let from = Uuid::new_v4();
        app.handle_message(Message {
            from,
            input: ClientInput::Invalid(InputError::Malformed),
        });
        app.handle_message(Message {
            from,
            input: ClientInput::Request(park("X", VehicleCategory::Car)),
        });
        app.handle_message(Message {
            from,
            input: ClientInput::StreamEnded,
        });
        // The request is still applied even though nobody is left to hear the answer.
        assert_eq!(1, app.manager().active_count());
    }
}
