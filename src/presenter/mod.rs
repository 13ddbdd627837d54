//! Presenter broadcast server.
//!
//! A local HTTP server on port 3333 serving an embedded speaker console
//! page; browsers connect a WebSocket at `/ws` and receive a JSON message
//! for every slide change plus one `init` message carrying the
//! presentation start time. No inbound messages are processed.
use std::io::Read;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Header, Response, Server, StatusCode};
use tungstenite::handshake::derive_accept_key;
use tungstenite::protocol::Role;
use tungstenite::{Message as WsMessage, WebSocket};

use crate::deck::Slide;

/// Port the presenter console is served on.
pub const PRESENTER_PORT: u16 = 3333;

const PRESENTER_HTML: &str = include_str!("../../assets/presenter.html");

type ClientSocket = WebSocket<Box<dyn tiny_http::ReadWrite + Send>>;
type ClientList = Arc<Mutex<Vec<ClientSocket>>>;

/// Messages pushed to connected presenter consoles.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PresenterMessage<'a> {
    Slide {
        #[serde(rename = "slideIndex")]
        slide_index: usize,
        #[serde(rename = "totalSlides")]
        total_slides: usize,
        title: &'a str,
        notes: &'a str,
        #[serde(rename = "nextTitle")]
        next_title: Option<&'a str>,
    },
    Init {
        #[serde(rename = "startTime")]
        start_time: u64,
    },
}

/// Cheap-to-clone handle to a running presenter server.
///
/// Broadcasts go through a channel drained by a dedicated thread, so
/// notifying never blocks navigation even when a client stalls.
#[derive(Clone)]
pub struct Presenter {
    tx: Sender<String>,
}

impl Presenter {
    /// Start the server, print the console URL, and block for one
    /// keypress before the presentation begins.
    ///
    /// # Errors
    /// Returns an error if the port cannot be bound or the terminal
    /// cannot take a keypress.
    pub fn start() -> Result<Self> {
        let server = Server::http(format!("0.0.0.0:{PRESENTER_PORT}"))
            .map_err(|err| anyhow::anyhow!("Failed to start presenter server: {err}"))?;
        let start_time = epoch_millis();
        let clients: ClientList = Arc::new(Mutex::new(Vec::new()));

        let accept_clients = Arc::clone(&clients);
        thread::spawn(move || accept_loop(&server, &accept_clients, start_time));

        let (tx, rx) = mpsc::channel::<String>();
        thread::spawn(move || {
            while let Ok(message) = rx.recv() {
                let Ok(mut clients) = clients.lock() else {
                    break;
                };
                clients.retain_mut(|client| {
                    client.send(WsMessage::Text(message.clone())).is_ok()
                });
            }
        });

        println!(
            "\x1b[36m[Presenter Mode]\x1b[0m Open in browser: \x1b[33mhttp://localhost:{PRESENTER_PORT}\x1b[0m"
        );
        println!("\x1b[2mPress any key to start presentation...\x1b[0m");
        wait_for_any_key().context("Failed to read start keypress")?;

        Ok(Self { tx })
    }

    /// Push the state of `slides[index]` to every connected console.
    /// Fire-and-forget: dead clients are dropped on the broadcast thread.
    pub fn notify_slide_change(&self, slides: &[Slide], index: usize) {
        let Some(json) = slide_message(slides, index) else {
            return;
        };
        let _ = self.tx.send(json);
    }
}

/// Serialize the broadcast for `slides[index]`, or `None` when the index
/// is out of range (possible transiently after a reload shrank the deck).
fn slide_message(slides: &[Slide], index: usize) -> Option<String> {
    let slide = slides.get(index)?;
    let message = PresenterMessage::Slide {
        slide_index: index,
        total_slides: slides.len(),
        title: slide.title(),
        notes: slide.notes(),
        next_title: slides.get(index + 1).map(Slide::title),
    };
    match serde_json::to_string(&message) {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::warn!("failed to serialize presenter message: {err}");
            None
        }
    }
}

fn accept_loop(server: &Server, clients: &ClientList, start_time: Option<u64>) {
    for request in server.incoming_requests() {
        if request.url() == "/ws" {
            match upgrade_websocket(request) {
                Ok(mut websocket) => {
                    if let Some(start_time) = start_time {
                        let init = PresenterMessage::Init { start_time };
                        if let Ok(json) = serde_json::to_string(&init) {
                            let _ = websocket.send(WsMessage::Text(json));
                        }
                    }
                    if let Ok(mut clients) = clients.lock() {
                        clients.push(websocket);
                    }
                }
                Err(err) => tracing::warn!("websocket upgrade failed: {err}"),
            }
        } else {
            let header = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
                .expect("valid header");
            let response = Response::from_string(PRESENTER_HTML).with_header(header);
            if let Err(err) = request.respond(response) {
                tracing::debug!("failed to serve presenter page: {err}");
            }
        }
    }
}

/// Complete the WebSocket handshake on a raw HTTP request.
fn upgrade_websocket(request: tiny_http::Request) -> Result<ClientSocket> {
    let key = request
        .headers()
        .iter()
        .find(|header| header.field.equiv("Sec-WebSocket-Key"))
        .map(|header| header.value.as_str().to_owned());
    let Some(key) = key else {
        let response = Response::from_string("WebSocket upgrade failed")
            .with_status_code(StatusCode(400));
        let _ = request.respond(response);
        anyhow::bail!("missing Sec-WebSocket-Key header");
    };

    let accept = derive_accept_key(key.as_bytes());
    let response = Response::empty(StatusCode(101)).with_header(
        Header::from_bytes(&b"Sec-WebSocket-Accept"[..], accept.as_bytes())
            .expect("valid header"),
    );
    let stream = request.upgrade("websocket", response);
    Ok(WebSocket::from_raw_socket(stream, Role::Server, None))
}

fn epoch_millis() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
}

/// Block until any key arrives, leaving the terminal cooked afterwards.
fn wait_for_any_key() -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut byte = [0u8; 1];
    let read = std::io::stdin().read(&mut byte);
    crossterm::terminal::disable_raw_mode()?;
    read?;
    Ok(())
}
