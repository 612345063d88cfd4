//! BDD test world for the device console

use std::sync::Arc;

use cucumber::World;
use device_console::command::{CommandDispatcher, CommandReceipt};
use device_console::sampler::{Sampler, SamplerHandle};
use device_console::state::StateHandle;
use tokio::task::JoinHandle;

#[derive(Debug, Default, World)]
pub struct ConsoleWorld {
    pub state: Option<StateHandle>,

    // Command dispatch
    pub dispatcher: Option<Arc<CommandDispatcher>>,
    pub pending_dispatch: Option<JoinHandle<device_console::Result<CommandReceipt>>>,
    pub dispatch_result: Option<device_console::Result<CommandReceipt>>,

    // Dashboard
    pub response_status: Option<u16>,
    pub response_body: Option<String>,

    // Sampling
    pub sampler: Option<SamplerWorld>,
}

/// Sampler plus the handle keeping its tasks alive
pub struct SamplerWorld {
    pub sampler: Sampler,
    pub handle: Option<SamplerHandle>,
}

impl std::fmt::Debug for SamplerWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplerWorld")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl ConsoleWorld {
    pub fn state(&self) -> StateHandle {
        Arc::clone(self.state.as_ref().expect("state not set"))
    }

    pub fn dispatcher(&self) -> Arc<CommandDispatcher> {
        Arc::clone(self.dispatcher.as_ref().expect("dispatcher not set"))
    }
}
