//! Page-context host.
//!
//! Owns the dispatcher for the lifetime of one page context and rebuilds
//! it whenever a shim announces a fresh page load. That mirrors how the
//! capture side works: page scripts are torn down on every navigation, so
//! nothing in memory survives a reload and continuity comes entirely from
//! the durable state restored in `on_context_start`.

use crate::server::Inbound;
use crate::source::RemoteSource;
use spoor_common::protocol::{CaptureMessage, ObserverControl, PageSignal};
use spoor_engine::config::SpoorConfig;
use spoor_engine::dispatcher::CommandDispatcher;
use spoor_engine::export::Exporter;
use spoor_engine::persist::FileStore;
use spoor_engine::recorder::Recorder;
use spoor_engine::store::TraceStore;
use std::path::PathBuf;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

pub struct Session {
    state_path: PathBuf,
    export_dir: PathBuf,
    control_tx: broadcast::Sender<ObserverControl>,
    dispatcher: Option<CommandDispatcher<FileStore>>,
}

impl Session {
    pub fn new(config: &SpoorConfig, control_tx: broadcast::Sender<ObserverControl>) -> Self {
        Self {
            state_path: config.storage.state_path(),
            export_dir: config.export.output_dir(),
            control_tx,
            dispatcher: None,
        }
    }

    /// Consume inbound frames until every sender is gone.
    pub async fn run(mut self, mut inbound_rx: mpsc::Receiver<Inbound>) {
        while let Some(frame) = inbound_rx.recv().await {
            match frame {
                Inbound::Capture(CaptureMessage::Page(PageSignal::PageLoaded { url })) => {
                    self.start_context(url).await;
                }
                Inbound::Capture(CaptureMessage::Input(event)) => match self.dispatcher.as_mut() {
                    Some(d) => d.engine_mut().handle_input(event).await,
                    None => debug!("input event before any page context, dropped"),
                },
                Inbound::Command(command, reply) => {
                    let ack = match self.dispatcher.as_mut() {
                        Some(d) => d.dispatch(command).await,
                        None => {
                            debug!("command {:?} before any page context, ignored", command);
                            None
                        }
                    };
                    // The issuing connection may already be gone.
                    let _ = reply.send(ack);
                }
            }
        }
    }

    /// Tear down the current page context and bring up a new one for
    /// `url`, restoring recording state from durable storage.
    async fn start_context(&mut self, url: String) {
        info!("page context started: {}", url);
        let store = TraceStore::new(FileStore::new(self.state_path.clone()));
        let source = RemoteSource::new(self.control_tx.clone());
        let mut engine = Recorder::new(url, store, Box::new(source));
        engine.on_context_start().await;
        let exporter = Exporter::new(self.export_dir.clone());
        self.dispatcher = Some(CommandDispatcher::new(engine, exporter));
    }
}
