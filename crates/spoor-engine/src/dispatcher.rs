//! Command dispatch boundary.
//!
//! Routes the four recording commands to the engine and the exporter.
//! Every path completes and returns an acknowledgement where the protocol
//! defines one; failures surface in logs, never to the caller.

use crate::export::Exporter;
use crate::persist::DurableStore;
use crate::recorder::Recorder;
use spoor_common::protocol::{Command, CommandAck};
use tracing::error;

pub struct CommandDispatcher<S: DurableStore> {
    engine: Recorder<S>,
    exporter: Exporter,
}

impl<S: DurableStore> CommandDispatcher<S> {
    pub fn new(engine: Recorder<S>, exporter: Exporter) -> Self {
        Self { engine, exporter }
    }

    /// Handle one command. `None` means handled without a payload.
    pub async fn dispatch(&mut self, command: Command) -> Option<CommandAck> {
        match command {
            Command::StartRecording => {
                self.engine.start().await;
                Some(CommandAck::Status { status: "Recording started".to_string() })
            }
            Command::StopRecording => {
                self.engine.stop().await;
                Some(CommandAck::Status { status: "Recording stopped".to_string() })
            }
            Command::DownloadActionTrace => {
                if let Err(e) = self.exporter.export(self.engine.store_mut()).await {
                    error!("trace export failed: {}", e);
                }
                None
            }
            Command::GetStatus => {
                let state = self.engine.status();
                Some(CommandAck::State {
                    is_recording: state.is_recording,
                    trace: state.trace,
                })
            }
        }
    }

    pub fn engine(&self) -> &Recorder<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Recorder<S> {
        &mut self.engine
    }
}
