//! End-to-end shipping through the public builder API.

use std::{
    net::TcpListener,
    sync::mpsc,
    thread,
    time::Duration,
};

use femtoship::{
    FlushReport, HandlerBuilderTrait, Level, LogRecord, SourceLocation, ViewerHandlerBuilder,
    file_config::builder_from_ini_str,
    viewer_handler::{control::parse_command, frame::read_frame},
};
use rstest::{fixture, rstest};

const WAIT: Duration = Duration::from_secs(5);

#[fixture]
fn viewer() -> (u16, mpsc::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
    let port = listener.local_addr().expect("listener has address").port();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        while let Ok(Some(frame)) = read_frame(&mut stream, usize::MAX) {
            if tx.send(frame).is_err() {
                return;
            }
        }
    });
    (port, rx)
}

#[rstest]
fn builder_handler_ships_json_records(viewer: (u16, mpsc::Receiver<Vec<u8>>)) {
    let (port, frames) = viewer;
    let mut handler = ViewerHandlerBuilder::new()
        .with_tcp("127.0.0.1", port)
        .with_format(femtoship::SerializationFormat::Json)
        .with_reconnect_interval_ms(10)
        .with_worker_interval_ms(5)
        .without_diagnostics()
        .build_inner()
        .expect("build handler");

    handler
        .submit(
            LogRecord::new("app.db", Level::Error, "pool exhausted")
                .with_location(SourceLocation::new("db.rs", 88, "db::acquire"))
                .with_metadata("pool", "primary")
                .with_metadata("message", "shadowed"),
        )
        .expect("submit record");

    let handshake = frames.recv_timeout(WAIT).expect("handshake");
    assert_eq!(parse_command(&handshake), Some(("format", "json")));

    let payload: serde_json::Value =
        serde_json::from_slice(&frames.recv_timeout(WAIT).expect("record frame"))
            .expect("json payload");
    assert_eq!(payload["name"], "app.db");
    assert_eq!(payload["levelname"], "ERROR");
    assert_eq!(payload["message"], "pool exhausted");
    assert_eq!(payload["line"], 88);
    assert_eq!(payload["pool"], "primary");

    assert_eq!(
        handler.close(),
        Some(FlushReport::Drained {
            delivered: 0,
            failed: 0
        })
    );
}

#[rstest]
fn ini_configured_handler_ships_records(viewer: (u16, mpsc::Receiver<Vec<u8>>)) {
    let (port, frames) = viewer;
    let ini = format!(
        "[viewer]\nhost = 127.0.0.1\nport = {port}\nreconnect_interval_ms = 10\n\
         worker_interval_ms = 600000\n"
    );
    let mut handler = builder_from_ini_str(&ini, None)
        .expect("parse ini")
        .without_diagnostics()
        .build_inner()
        .expect("build handler");

    let handshake = frames.recv_timeout(WAIT).expect("handshake");
    assert_eq!(parse_command(&handshake), Some(("format", "msgpack")));

    for i in 0..3 {
        handler
            .submit(LogRecord::new("app", Level::Info, &format!("queued {i}")))
            .expect("submit record");
    }
    let report = handler.flush().expect("flush acknowledged");
    assert_eq!(
        report,
        FlushReport::Drained {
            delivered: 3,
            failed: 0
        }
    );
    for _ in 0..3 {
        frames.recv_timeout(WAIT).expect("flushed record");
    }
    handler.close();
}
