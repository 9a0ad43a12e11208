#![allow(dead_code)]
pub mod log_capture;

use std::net::TcpListener;

/// Returns a localhost port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}
