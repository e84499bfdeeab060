//! Input source backed by connected capture shims.

use spoor_common::protocol::ObserverControl;
use spoor_engine::recorder::InputSource;
use tokio::sync::broadcast;
use tracing::debug;

/// Attaching broadcasts `observe` so every connected shim installs its DOM
/// listeners; detaching broadcasts `unobserve`. The events themselves
/// arrive through the server's inbound stream, not through this handle.
pub struct RemoteSource {
    control_tx: broadcast::Sender<ObserverControl>,
    attached: bool,
}

impl RemoteSource {
    pub fn new(control_tx: broadcast::Sender<ObserverControl>) -> Self {
        Self { control_tx, attached: false }
    }

    fn signal(&self, control: ObserverControl) {
        if self.control_tx.receiver_count() == 0 {
            debug!("no capture shim connected, {:?} not delivered", control);
            return;
        }
        // Send only fails with zero receivers, checked above.
        let _ = self.control_tx.send(control);
    }
}

impl InputSource for RemoteSource {
    fn attach(&mut self) {
        self.signal(ObserverControl::Observe);
        self.attached = true;
    }

    fn detach(&mut self) {
        self.signal(ObserverControl::Unobserve);
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}
