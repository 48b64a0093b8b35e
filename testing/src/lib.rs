use std::io::{ErrorKind, Read};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Binds to an ephemeral port chosen by the OS, so parallel tests never race for the same port.
pub fn listen_on_available_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("Could not bind an integration listener.");
    let port = listener.local_addr().expect("Integration listener has no local address.").port();
    (listener, port)
}

pub fn connect(port: u16) -> TcpStream {
    TcpStream::connect(("127.0.0.1", port)).expect("Could not connect to integration server.")
}

/// Reads a single `\n`-terminated line, one byte at a time so nothing past the line is consumed.
pub fn read_line(stream: &mut TcpStream, timeout: Duration) -> std::io::Result<String> {
    stream.set_read_timeout(Some(timeout))?;
    let mut line: Vec<u8> = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte) {
            Ok(0) => break,
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => line.push(byte[0]),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                stream.set_read_timeout(None)?;
                return Err(e);
            }
        }
    }
    stream.set_read_timeout(None)?;
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

#[macro_export]
macro_rules! send_line_from {
    ($s:expr, $l:expr) => {{
        use std::io::Write;
        _ = $s.write_all(format!("{}\n", $l).as_bytes());
    }};
}

#[macro_export]
macro_rules! assert_client_receives_line (
    ($s:expr, $l:expr, $d:expr) => {{
        match $crate::read_line(&mut $s, $d) {
            Err(e)  => panic!("Client connection errored: {e:?}"),
            Ok(line) => assert_eq!($l, line),
        };
    }};
    ($s:expr, $l:expr) => {{
        $crate::assert_client_receives_line!($s, $l, $crate::DEFAULT_TIMEOUT)
    }};
);

/// Asserts the server closed the connection: the next read sees end-of-stream.
#[macro_export]
macro_rules! assert_client_disconnected (
    ($s:expr) => {{
        use std::io::Read;

        let client = &mut $s;
        let mut buffer = [0u8; 1];
        client.set_read_timeout(Some($crate::DEFAULT_TIMEOUT)).expect("Could not set read timeout.");
        match client.read(&mut buffer) {
            Ok(0) => (),
            Ok(_) => panic!("Client unexpectedly received data: {:02x}", buffer[0]),
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => (),
            Err(e) => panic!("Client connection was not closed: {e:?}"),
        }
    }};
);
