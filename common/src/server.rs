use crate::DEFAULT_PORT;
use std::io;
use std::net::{SocketAddr, TcpListener};
use tracing::info;

pub fn get_tcp_listener(port: Option<u16>) -> io::Result<TcpListener> {
    let port = port.unwrap_or(DEFAULT_PORT);
    let address: SocketAddr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener: TcpListener = TcpListener::bind(address)?;
    info!("Listening to connections on port {port}...");
    Ok(listener)
}
