//! Device Console - IoT device monitoring dashboard
//!
//! Samples telemetry and self-test results from a data source into bounded
//! buffers, serves them as a web dashboard, and dispatches commands to devices.

pub mod buffer;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod device;
pub mod error;
pub mod sampler;
pub mod simulation;
pub mod snapshot;
pub mod source;
pub mod state;
pub mod telemetry;

pub use config::{load_config, Config};
pub use error::{ConsoleError, Result};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::command::{CommandDispatcher, CommandTransport, SimulatedTransport};
use crate::device::DeviceRegistry;
use crate::sampler::{Sampler, SamplerIntervals};
use crate::simulation::SyntheticSource;
use crate::source::DataSource;
use crate::state::{current_epoch_ms, new_state_handle, StateHandle};

/// Builder for the console service.
///
/// Defaults to the synthetic data source and the simulated command
/// transport; either can be replaced before building.
pub struct ConsoleBuilder {
    config: Config,
    source: Option<Arc<dyn DataSource>>,
    transport: Option<Arc<dyn CommandTransport>>,
}

impl ConsoleBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            source: None,
            transport: None,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn CommandTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the configuration, assemble the state and bind the dashboard
    pub async fn build(self) -> Result<Console> {
        let config = self.config;
        config.validate()?;

        let registry = DeviceRegistry::from_config(&config.devices, current_epoch_ms());
        tracing::debug!(
            "Registered {} devices ({} online)",
            registry.len(),
            registry.online_count()
        );
        let state = new_state_handle(registry, &config.buffers);

        let source = self
            .source
            .unwrap_or_else(|| Arc::new(SyntheticSource::new(&config.simulation)));
        let transport = self.transport.unwrap_or_else(|| {
            Arc::new(SimulatedTransport::new(Duration::from_millis(
                config.commands.send_delay_ms,
            )))
        });

        let cancel = CancellationToken::new();
        let dispatcher = Arc::new(CommandDispatcher::new(transport, &state));
        let sampler = Sampler::new(
            source,
            Arc::clone(&state),
            SamplerIntervals::from_config(&config.simulation),
            cancel.clone(),
        );

        let listener = if config.dashboard.enabled {
            let addr = SocketAddr::from(([0, 0, 0, 0], config.dashboard.port));
            let listener = TcpListener::bind(addr).await.map_err(|e| {
                ConsoleError::Dashboard(format!(
                    "Failed to bind dashboard to port {}: {}",
                    config.dashboard.port, e
                ))
            })?;
            tracing::info!("Dashboard bound to http://{}", listener.local_addr()?);
            Some(listener)
        } else {
            tracing::info!("Dashboard disabled");
            None
        };

        Ok(Console {
            state,
            dispatcher,
            sampler,
            listener,
            cancel,
        })
    }
}

/// A built console, ready to start
pub struct Console {
    state: StateHandle,
    dispatcher: Arc<CommandDispatcher>,
    sampler: Sampler,
    listener: Option<TcpListener>,
    cancel: CancellationToken,
}

impl Console {
    pub fn state(&self) -> StateHandle {
        Arc::clone(&self.state)
    }

    pub fn dispatcher(&self) -> Arc<CommandDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Address the dashboard is listening on, if enabled
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Token that stops the console when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until Ctrl-C or until the cancel token fires
    pub async fn start(self) -> Result<()> {
        let Console {
            state,
            dispatcher,
            sampler,
            listener,
            cancel,
        } = self;

        sampler.connect().await;
        let sampling = sampler.start();

        let cancel_for_signal = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => {
                        tracing::info!("Shutdown signal received");
                        cancel_for_signal.cancel();
                    }
                    Err(e) => tracing::warn!("Failed to listen for ctrl-c: {}", e),
                },
                _ = cancel_for_signal.cancelled() => {}
            }
        });

        tracing::info!("Device console started");

        let served = match listener {
            Some(listener) => {
                let router = dashboard::build_router(state, dispatcher);
                let cancel_for_dashboard = cancel.clone();
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        cancel_for_dashboard.cancelled().await;
                    })
                    .await;
                tracing::debug!("Dashboard stopped");
                result.map_err(ConsoleError::from)
            }
            None => {
                cancel.cancelled().await;
                Ok(())
            }
        };

        sampling.shutdown().await;
        sampler.disconnect().await;
        tracing::info!("Device console stopped");

        served
    }
}

/// Run the console with the given configuration and default collaborators
pub async fn run(config: Config) -> Result<()> {
    ConsoleBuilder::new(config).build().await?.start().await
}
