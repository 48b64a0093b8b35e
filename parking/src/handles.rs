use crate::io::{ClientInput, Message};
use crate::{parser, MAX_LINE_LENGTH};
use common::{BUFFER_SIZE, THREAD_SLOW_DOWN};
use std::io::{ErrorKind, Read};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// A client that stops reading must not stall every other client's requests.
pub(crate) const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) fn acceptor(listener: TcpListener, transmitter: Sender<Message>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!("Incoming TCP connection stream errored... {err:?}");
                continue;
            },
        };
        let id = Uuid::new_v4();
        match stream.peer_addr() {
            Ok(addr) => info!("Accepting new connection {id} from {addr}..."),
            Err(_) => info!("Accepting new connection {id}..."),
        }

        if let Err(err) = stream.set_write_timeout(Some(WRITE_TIMEOUT)) {
            warn!("Could not bound writes to connection {id}: {err:?}");
            _ = stream.shutdown(Shutdown::Both);
            continue;
        }

        let read_stream = match stream.try_clone() {
            Ok(read_stream) => read_stream,
            Err(err) => {
                warn!("Could not split connection {id}: {err:?}");
                _ = stream.shutdown(Shutdown::Both);
                continue;
            },
        };

        // The application must know the connection before the first request can arrive.
        if transmitter
            .send(Message {
                from: id,
                input: ClientInput::Connected(stream),
            })
            .is_err()
        {
            break;
        }
        let thread_transmitter = transmitter.clone();
        thread::spawn(move || connection(id, read_stream, thread_transmitter));
    }
}

pub(crate) fn connection(id: Uuid, mut stream: TcpStream, transmitter: Sender<Message>) {
    let mut buffer = [0u8; BUFFER_SIZE];
    let mut queue: Vec<u8> = Vec::new();

    let end_reason: ClientInput;
    'connected: loop {
        match stream.read(&mut buffer) {
            Ok(0) => {
                end_reason = ClientInput::StreamEnded;
                break 'connected;
            },
            Ok(n) => queue.extend_from_slice(&buffer[..n]),
            Err(ref err) if err.kind() == ErrorKind::WouldBlock => {
                thread::sleep(THREAD_SLOW_DOWN);
                continue 'connected;
            },
            Err(ref err) if err.kind() == ErrorKind::Interrupted => continue 'connected,
            Err(_) => {
                end_reason = ClientInput::StreamErrored;
                break 'connected;
            },
        };

        'parse: loop {
            match parser::nom(&queue) {
                // Not enough data has been received by the TCP stream, go back and fetch more.
                None => break 'parse,
                Some((outcome, drain)) => {
                    let input = match outcome {
                        Ok(request) => ClientInput::Request(request),
                        Err(error) => ClientInput::Invalid(error),
                    };
                    if transmitter.send(Message { from: id, input }).is_err() {
                        return;
                    }
                    queue.drain(..drain);
                },
            }
        }

        if queue.len() > MAX_LINE_LENGTH {
            warn!("{id}: request line exceeds {MAX_LINE_LENGTH} bytes.");
            end_reason = ClientInput::StreamErrored;
            break 'connected;
        }
    }

    _ = transmitter.send(Message {
        from: id,
        input: end_reason,
    });
}

#[cfg(test)]
mod tests {
    use super::{acceptor, WRITE_TIMEOUT};
    use crate::io::{ClientInput, Message};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_accepted_streams_have_bounded_writes() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("Could not bind test listener.");
        let port = listener.local_addr().expect("Listener has no local address.").port();
        let (transmitter, receiver) = mpsc::channel::<Message>();
        thread::spawn(move || acceptor(listener, transmitter));

        let _client = TcpStream::connect(("127.0.0.1", port)).expect("Could not connect.");
        let message = receiver
            .recv_timeout(Duration::from_secs(1))
            .expect("Acceptor should announce the connection.");
        let ClientInput::Connected(stream) = message.input else {
            panic!("Expected a new connection, got {:?}", message.input);
        };
        assert_eq!(Some(WRITE_TIMEOUT), stream.write_timeout().expect("Could not read write timeout."));
    }
}
