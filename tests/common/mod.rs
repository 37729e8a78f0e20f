//! Shared test utilities.
//!
//! - Mock consoles that print a boot log announcing an address
//! - `FirmwareStub`: an in-process imitation of the web-server firmware
//! - Client/runner builders pointed at the stub

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dut_probe::config::HttpConfig;
use dut_probe::{ConsoleReader, DutAddress, DutClient, FirmwareProfile, MockSerialPort, ProbeRunner};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::oneshot;

/// Boot log of the web-server firmware, address after the start marker.
pub fn boot_log(ip: &str) -> Vec<String> {
    vec![
        "ets Jun  8 2016 00:22:57".to_string(),
        "rst:0x1 (POWERON_RESET),boot:0x13 (SPI_FAST_FLASH_BOOT)".to_string(),
        "I (29) boot: ESP-IDF v5.1.2 2nd stage bootloader".to_string(),
        "\x1b[0;32mI (612) WEBSERVER: Starting ESP32 Web Server\x1b[0m".to_string(),
        "\x1b[0;32mI (702) WEBSERVER: Starting HTTP Server on port: '80'\x1b[0m".to_string(),
        "\x1b[0;32mI (705) WEBSERVER: Registering URI handlers\x1b[0m".to_string(),
        format!("\x1b[0;32mI (711) WEBSERVER: Access the web server at http://{ip}\x1b[0m"),
    ]
}

/// A console reader replaying `lines`, delivered in small fragments.
pub fn mock_console(lines: &[String]) -> ConsoleReader {
    let mut port = MockSerialPort::with_lines("MOCK0", lines);
    port.set_chunk_size(37);
    ConsoleReader::new(Box::new(port), Duration::from_millis(5))
}

pub fn loopback() -> DutAddress {
    "127.0.0.1".parse().expect("loopback parses")
}

pub fn client_for(stub: &FirmwareStub) -> DutClient {
    DutClient::new(&HttpConfig {
        port: stub.port(),
        timeout_ms: 2_000,
        connect_timeout_ms: 1_000,
    })
    .expect("client builds")
}

pub fn runner_for(stub: &FirmwareStub, profile: FirmwareProfile) -> ProbeRunner {
    ProbeRunner::new(client_for(stub), profile)
}

/// Language of the LED route responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Russian,
    English,
}

/// How the stub firmware behaves.
#[derive(Debug, Clone)]
pub struct StubBehaviour {
    pub led_routes: bool,
    pub language: Language,
    /// Replace `/status` with this status code and raw body.
    pub status_override: Option<(StatusCode, &'static str)>,
    /// Delay before answering `/status`.
    pub status_delay: Option<Duration>,
}

impl StubBehaviour {
    pub fn basic() -> Self {
        Self {
            led_routes: false,
            language: Language::Russian,
            status_override: None,
            status_delay: None,
        }
    }

    pub fn led(language: Language) -> Self {
        Self {
            led_routes: true,
            language,
            ..Self::basic()
        }
    }
}

struct StubState {
    behaviour: StubBehaviour,
    led_on: AtomicBool,
    hits: AtomicUsize,
}

/// Web-server firmware imitation listening on an ephemeral loopback port.
///
/// Runs on its own thread and runtime so blocking clients can be used from
/// the test thread. Shuts down on drop.
pub struct FirmwareStub {
    addr: SocketAddr,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl FirmwareStub {
    pub fn start(behaviour: StubBehaviour) -> Self {
        let state = Arc::new(StubState {
            behaviour,
            led_on: AtomicBool::new(false),
            hits: AtomicUsize::new(0),
        });

        let mut app = Router::new()
            .route("/", get(root))
            .route("/status", get(status))
            .route("/info", get(info));
        if state.behaviour.led_routes {
            app = app
                .route("/ledon", get(led_on))
                .route("/ledoff", get(led_off))
                .route("/ledtoggle", get(led_toggle));
        }
        let app = app.with_state(state.clone());

        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind stub listener");
                addr_tx
                    .send(listener.local_addr().expect("stub address"))
                    .expect("report stub address");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("stub server");
            });
        });

        let addr = addr_rx.recv().expect("stub started");
        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Requests served so far, across all routes.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn led_is_on(&self) -> bool {
        self.state.led_on.load(Ordering::SeqCst)
    }

    /// Stop serving; later requests fail to connect.
    pub fn stop(mut self) -> u16 {
        let port = self.port();
        self.shutdown_now();
        port
    }

    fn shutdown_now(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for FirmwareStub {
    fn drop(&mut self) {
        self.shutdown_now();
    }
}

async fn root(State(state): State<Arc<StubState>>) -> Html<String> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let led_section = if state.behaviour.led_routes {
        "<p>LED: <a href=\"/ledon\">ON</a> <a href=\"/ledoff\">OFF</a> <a href=\"/ledtoggle\">Toggle</a></p>"
    } else {
        ""
    };
    Html(format!(
        "<!DOCTYPE html><html><head><title>ESP32 Web Server</title></head><body>\
         <h1>ESP32 Web Server</h1><p>Welcome to the ESP32 Web Server!</p>{led_section}\
         <p><a href=\"/status\">Check System Status</a></p></body></html>"
    ))
}

async fn status(State(state): State<Arc<StubState>>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = state.behaviour.status_delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((code, body)) = state.behaviour.status_override {
        return (code, [(header::CONTENT_TYPE, "application/json")], body).into_response();
    }

    let body = if state.behaviour.led_routes {
        json!({
            "uptime": 42,
            "free_heap": 214_532,
            "min_free_heap": 201_100,
            "led_state": state.led_on.load(Ordering::SeqCst),
            "chip_model": "ESP32",
            "cores": 2,
        })
    } else {
        json!({
            "uptime": 42,
            "free_heap": 214_532,
            "min_free_heap": 201_100,
            "cpu_freq_mhz": 240,
        })
    };
    Json(body).into_response()
}

async fn info(State(state): State<Arc<StubState>>) -> Json<serde_json::Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "model": "ESP32",
        "cores": 2,
        "features": ["WiFi", "BT", "BLE"],
        "revision": 3,
        "flash_size_mb": 4,
    }))
}

fn led_text(state: &StubState, russian: &'static str, english: &'static str) -> &'static str {
    match state.behaviour.language {
        Language::Russian => russian,
        Language::English => english,
    }
}

async fn led_on(State(state): State<Arc<StubState>>) -> &'static str {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.led_on.store(true, Ordering::SeqCst);
    led_text(&state, "Светодиод включен", "LED is ON")
}

async fn led_off(State(state): State<Arc<StubState>>) -> &'static str {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.led_on.store(false, Ordering::SeqCst);
    led_text(&state, "Светодиод выключен", "LED is OFF")
}

async fn led_toggle(State(state): State<Arc<StubState>>) -> &'static str {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.led_on.fetch_xor(true, Ordering::SeqCst);
    led_text(&state, "Светодиод переключен", "LED toggled")
}
