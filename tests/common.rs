#![allow(dead_code)]

use async_std::net::{TcpListener, TcpStream};
use async_std::task;
use futures_util::io::{AsyncReadExt, AsyncWriteExt};
use oneshot_h1::{Client, Config, HeaderCollection};
use std::io;
use std::sync::Once;
use std::time::Duration;

/// A request as seen by the test server.
#[derive(Debug)]
pub struct Received {
    pub head: String,
    pub body: Vec<u8>,
}

impl Received {
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// First value of a header, looked up ignoring case.
    pub fn header(&self, name: &str) -> Option<String> {
        let mut h = HeaderCollection::new();
        h.set_from_block(&self.head);
        h.get_str(name).map(|s| s.to_string())
    }
}

/// Serve exactly one connection. `f` gets the request and returns the raw response bytes.
///
/// The returned handle resolves to the request the server received.
pub async fn serve_once<F>(f: F) -> io::Result<(u16, task::JoinHandle<Received>)>
where
    F: FnOnce(&Received) -> Vec<u8> + Send + 'static,
{
    let l = TcpListener::bind("127.0.0.1:0").await?;
    serve_once_on(l, f)
}

/// Like `serve_once`, on an already bound listener.
pub fn serve_once_on<F>(l: TcpListener, f: F) -> io::Result<(u16, task::JoinHandle<Received>)>
where
    F: FnOnce(&Received) -> Vec<u8> + Send + 'static,
{
    setup_logger();

    let port = l.local_addr()?.port();

    let handle = task::spawn(async move {
        let (mut tcp, _) = l.accept().await.expect("Accept failed");

        let received = read_request(&mut tcp).await.expect("Read request failed");

        let res = f(&received);
        tcp.write_all(&res).await.expect("Write response failed");
        tcp.close().await.ok();

        received
    });

    Ok((port, handle))
}

/// Accept one connection, read the request and then never answer.
pub async fn serve_stall() -> io::Result<u16> {
    setup_logger();

    let l = TcpListener::bind("127.0.0.1:0").await?;
    let port = l.local_addr()?.port();

    task::spawn(async move {
        let (mut tcp, _) = l.accept().await.expect("Accept failed");
        read_request(&mut tcp).await.ok();
        task::sleep(Duration::from_secs(10)).await;
        drop(tcp);
    });

    Ok(port)
}

/// A port nothing listens on.
pub async fn closed_port() -> io::Result<u16> {
    let l = TcpListener::bind("127.0.0.1:0").await?;
    let port = l.local_addr()?.port();
    drop(l);
    Ok(port)
}

/// Read head up until \r\n\r\n, then as many body bytes as content-length says.
pub async fn read_request(tcp: &mut TcpStream) -> io::Result<Received> {
    const END_OF_HEADER: &[u8] = b"\r\n\r\n";

    let mut head = vec![];
    let mut one = [0_u8; 1];

    while !head.ends_with(END_OF_HEADER) {
        let amount = tcp.read(&mut one).await?;
        if amount == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "EOF before complete http11 header",
            ));
        }
        head.push(one[0]);
    }

    let head = String::from_utf8(head).expect("Non-utf8 request head");

    let mut received = Received { head, body: vec![] };

    let len: usize = received
        .header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    received.body = vec![0; len];
    tcp.read_exact(&mut received.body).await?;

    Ok(received)
}

/// Client without default headers, so request heads are predictable.
pub fn client() -> Client {
    Client::with_config(Config {
        user_agent: "test".into(),
        default_headers: HeaderCollection::new(),
        ..Config::default()
    })
}

pub fn setup_logger() {
    static START: Once = Once::new();
    START.call_once(|| {
        let test_log = std::env::var("TEST_LOG")
            .map(|x| x != "0" && x.to_lowercase() != "false")
            .unwrap_or(false);
        let level = if test_log {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        };
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Warn)
            .filter_module("oneshot_h1", level)
            .target(env_logger::Target::Stdout)
            .init();
    });
}
