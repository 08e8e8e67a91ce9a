//! INI configuration for the viewer handler.
//!
//! A single section (by default `[viewer]`) describes one handler. Each key
//! maps onto a [`ViewerHandlerBuilder`] setter; the builder still performs
//! the usual validation when the handler is built.
//!
//! ```ini
//! [viewer]
//! host = localhost
//! port = 19996
//! format = msgpack
//! batch_size = 100
//! ```

use std::{path::Path, str::FromStr};

use ini::{Ini, Properties};

use crate::{
    handlers::{HandlerBuildError, ViewerHandlerBuilder},
    viewer_handler::{DEFAULT_PORT, SerializationFormat},
};

/// Section consulted when the caller does not name one.
pub const DEFAULT_SECTION: &str = "viewer";

/// Parse INI text and configure a builder from `section`.
pub fn builder_from_ini_str(
    text: &str,
    section: Option<&str>,
) -> Result<ViewerHandlerBuilder, HandlerBuildError> {
    let ini = Ini::load_from_str(text)
        .map_err(|err| HandlerBuildError::InvalidConfig(format!("invalid ini: {err}")))?;
    builder_from_ini(&ini, section.unwrap_or(DEFAULT_SECTION))
}

/// Read an INI file and configure a builder from `section`.
pub fn builder_from_ini_file(
    path: impl AsRef<Path>,
    section: Option<&str>,
) -> Result<ViewerHandlerBuilder, HandlerBuildError> {
    let path = path.as_ref();
    let ini = Ini::load_from_file(path).map_err(|err| match err {
        ini::Error::Io(err) => HandlerBuildError::Io(err),
        ini::Error::Parse(err) => {
            HandlerBuildError::InvalidConfig(format!("{} is invalid: {err}", path.display()))
        }
    })?;
    builder_from_ini(&ini, section.unwrap_or(DEFAULT_SECTION))
}

fn builder_from_ini(ini: &Ini, section: &str) -> Result<ViewerHandlerBuilder, HandlerBuildError> {
    let props = ini.section(Some(section)).ok_or_else(|| {
        HandlerBuildError::InvalidConfig(format!("missing [{section}] section"))
    })?;
    reject_unknown_keys(props, section)?;

    let host = props.get("host").unwrap_or("localhost");
    let port = parse_key::<u16>(props, "port")?.unwrap_or(DEFAULT_PORT);
    let mut builder = ViewerHandlerBuilder::new().with_tcp(host, port);

    if let Some(format) = parse_key::<SerializationFormat>(props, "format")? {
        builder = builder.with_format(format);
    }
    if let Some(value) = parse_key(props, "connect_timeout_ms")? {
        builder = builder.with_connect_timeout_ms(value);
    }
    if let Some(value) = parse_key(props, "write_timeout_ms")? {
        builder = builder.with_write_timeout_ms(value);
    }
    if let Some(value) = parse_key(props, "reconnect_interval_ms")? {
        builder = builder.with_reconnect_interval_ms(value);
    }
    if let Some(value) = parse_key(props, "worker_interval_ms")? {
        builder = builder.with_worker_interval_ms(value);
    }
    if let Some(value) = parse_key(props, "flush_timeout_ms")? {
        builder = builder.with_flush_timeout_ms(value);
    }
    if let Some(value) = parse_key(props, "batch_size")? {
        builder = builder.with_batch_size(value);
    }
    if let Some(value) = parse_key(props, "max_frame_size")? {
        builder = builder.with_max_frame_size(value);
    }
    if let Some(target) = props.get("diagnostic_target") {
        builder = builder.with_diagnostic_target(target);
    }
    Ok(builder)
}

const KNOWN_KEYS: [&str; 11] = [
    "host",
    "port",
    "format",
    "connect_timeout_ms",
    "write_timeout_ms",
    "reconnect_interval_ms",
    "worker_interval_ms",
    "flush_timeout_ms",
    "batch_size",
    "max_frame_size",
    "diagnostic_target",
];

fn reject_unknown_keys(props: &Properties, section: &str) -> Result<(), HandlerBuildError> {
    match props.iter().find(|(key, _)| !KNOWN_KEYS.contains(key)) {
        Some((key, _)) => Err(HandlerBuildError::InvalidConfig(format!(
            "unknown key {key:?} in [{section}]"
        ))),
        None => Ok(()),
    }
}

fn parse_key<T>(props: &Properties, key: &str) -> Result<Option<T>, HandlerBuildError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    props
        .get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|err| {
                HandlerBuildError::InvalidConfig(format!("invalid value for {key}: {err}"))
            })
        })
        .transpose()
}
