//! Builder for [`ViewerHandler`](crate::viewer_handler::ViewerHandler).
//!
//! Exposes the viewer address, timeout and polling intervals, batch and
//! frame sizing, the payload format, diagnostics routing, and the backoff
//! applied when a socket cannot be created.

use std::time::Duration;

use crate::{
    diagnostics::Diagnostics,
    viewer_handler::{
        BackoffPolicy, SerializationFormat, TcpTarget, ViewerHandler, ViewerHandlerConfig,
    },
};

use super::{HandlerBuildError, HandlerBuilderTrait};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(HandlerBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Overrides for the socket creation backoff.
#[derive(Clone, Debug, Default)]
pub struct BackoffOverrides {
    base_ms: Option<u64>,
    cap_ms: Option<u64>,
    deadline_ms: Option<u64>,
}

impl BackoffOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    option_setter!(
        #[doc = "Override the initial retry delay in milliseconds."]
        with_base_ms,
        base_ms,
        u64
    );
    option_setter!(
        #[doc = "Override the maximum retry delay in milliseconds."]
        with_cap_ms,
        cap_ms,
        u64
    );
    option_setter!(
        #[doc = "Override how long failures may persist before becoming permanent."]
        with_deadline_ms,
        deadline_ms,
        u64
    );

    fn apply(&self, policy: &mut BackoffPolicy) -> Result<(), HandlerBuildError> {
        if let Some(base) = self.base_ms {
            policy.base = Duration::from_millis(ensure_positive!(base, "backoff_base_ms")?);
        }
        if let Some(cap) = self.cap_ms {
            policy.cap = Duration::from_millis(ensure_positive!(cap, "backoff_cap_ms")?);
        }
        if let Some(deadline) = self.deadline_ms {
            policy.deadline =
                Duration::from_millis(ensure_positive!(deadline, "backoff_deadline_ms")?);
        }
        if policy.cap < policy.base {
            return Err(HandlerBuildError::InvalidConfig(
                "backoff_cap_ms must not be below backoff_base_ms".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
enum RecoveryConfig {
    #[default]
    Default,
    Disabled,
    Custom(BackoffOverrides),
}

#[derive(Clone, Debug, Default)]
enum DiagnosticsConfig {
    #[default]
    Default,
    Disabled,
    Target(String),
}

/// Builder for constructing [`ViewerHandler`] instances.
#[derive(Clone, Debug, Default)]
pub struct ViewerHandlerBuilder {
    target: Option<(String, u16)>,
    format: Option<SerializationFormat>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    reconnect_interval_ms: Option<u64>,
    worker_interval_ms: Option<u64>,
    batch_size: Option<usize>,
    max_frame_size: Option<usize>,
    flush_timeout_ms: Option<u64>,
    recovery: RecoveryConfig,
    diagnostics: DiagnosticsConfig,
}

impl ViewerHandlerBuilder {
    /// Create a new builder with no target configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewer host and port.
    pub fn with_tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.target = Some((host.into(), port));
        self
    }

    option_setter!(
        #[doc = "Set the payload format negotiated with the viewer."]
        with_format,
        format,
        SerializationFormat
    );
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_write_timeout_ms, write_timeout_ms, u64);
    option_setter!(
        #[doc = "Set the tick period used while connecting."]
        with_reconnect_interval_ms,
        reconnect_interval_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the tick period used while shipping records."]
        with_worker_interval_ms,
        worker_interval_ms,
        u64
    );
    option_setter!(
        #[doc = "Set how many records one shipping tick may send."]
        with_batch_size,
        batch_size,
        usize
    );
    option_setter!(with_max_frame_size, max_frame_size, usize);
    option_setter!(with_flush_timeout_ms, flush_timeout_ms, u64);

    /// Retry socket creation failures with the given backoff overrides.
    pub fn with_recovery(mut self, overrides: BackoffOverrides) -> Self {
        self.recovery = RecoveryConfig::Custom(overrides);
        self
    }

    /// Treat a socket creation failure as permanent.
    pub fn without_recovery(mut self) -> Self {
        self.recovery = RecoveryConfig::Disabled;
        self
    }

    /// Report connectivity problems under the given `log` target.
    pub fn with_diagnostic_target(mut self, target: impl Into<String>) -> Self {
        self.diagnostics = DiagnosticsConfig::Target(target.into());
        self
    }

    /// Do not report connectivity problems at all.
    pub fn without_diagnostics(mut self) -> Self {
        self.diagnostics = DiagnosticsConfig::Disabled;
        self
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        self.validate_target()?;
        self.validate_timings()?;
        self.validate_sizes()?;
        self.validate_diagnostics()
    }

    fn validate_target(&self) -> Result<(), HandlerBuildError> {
        match &self.target {
            None => Err(HandlerBuildError::InvalidConfig(
                "viewer handler requires a tcp target".into(),
            )),
            Some((host, _)) if host.trim().is_empty() => Err(HandlerBuildError::InvalidConfig(
                "tcp host must not be empty".into(),
            )),
            Some((_, 0)) => Err(HandlerBuildError::InvalidConfig(
                "tcp port must be greater than zero".into(),
            )),
            Some(_) => Ok(()),
        }
    }

    fn validate_timings(&self) -> Result<(), HandlerBuildError> {
        let timings = [
            (self.connect_timeout_ms, "connect_timeout_ms"),
            (self.write_timeout_ms, "write_timeout_ms"),
            (self.reconnect_interval_ms, "reconnect_interval_ms"),
            (self.worker_interval_ms, "worker_interval_ms"),
            (self.flush_timeout_ms, "flush_timeout_ms"),
        ];
        for (value, field) in timings {
            if let Some(value) = value {
                ensure_positive!(value, field)?;
            }
        }
        Ok(())
    }

    fn validate_sizes(&self) -> Result<(), HandlerBuildError> {
        if let Some(size) = self.batch_size {
            ensure_positive!(size, "batch_size")?;
        }
        if let Some(size) = self.max_frame_size {
            ensure_positive!(size, "max_frame_size")?;
        }
        Ok(())
    }

    fn validate_diagnostics(&self) -> Result<(), HandlerBuildError> {
        match &self.diagnostics {
            DiagnosticsConfig::Target(target) if target.trim().is_empty() => Err(
                HandlerBuildError::InvalidConfig("diagnostic_target must not be empty".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Validate the settings and produce the runtime configuration.
    pub fn build_config(&self) -> Result<ViewerHandlerConfig, HandlerBuildError> {
        self.validate()?;
        let mut config = ViewerHandlerConfig::default();
        if let Some((host, port)) = &self.target {
            config.target = TcpTarget::new(host.clone(), *port);
        }
        self.apply_optional_fields(&mut config);
        config.recovery = match &self.recovery {
            RecoveryConfig::Default => Some(BackoffPolicy::default()),
            RecoveryConfig::Disabled => None,
            RecoveryConfig::Custom(overrides) => {
                let mut policy = BackoffPolicy::default();
                overrides.apply(&mut policy)?;
                Some(policy)
            }
        };
        config.diagnostics = match &self.diagnostics {
            DiagnosticsConfig::Default => Diagnostics::default(),
            DiagnosticsConfig::Disabled => Diagnostics::disabled(),
            DiagnosticsConfig::Target(target) => Diagnostics::new(target.clone()),
        };
        Ok(config)
    }

    fn apply_optional_fields(&self, config: &mut ViewerHandlerConfig) {
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(timeout);
        }
        if let Some(timeout) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(timeout);
        }
        if let Some(interval) = self.reconnect_interval_ms {
            config.reconnect_interval = Duration::from_millis(interval);
        }
        if let Some(interval) = self.worker_interval_ms {
            config.worker_interval = Duration::from_millis(interval);
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(size) = self.max_frame_size {
            config.max_frame_size = size;
        }
        if let Some(timeout) = self.flush_timeout_ms {
            config.flush_timeout = Duration::from_millis(timeout);
        }
    }
}

impl HandlerBuilderTrait for ViewerHandlerBuilder {
    type Handler = ViewerHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        let config = self.build_config()?;
        Ok(ViewerHandler::with_config(config))
    }
}
