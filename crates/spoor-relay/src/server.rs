//! WebSocket endpoint for capture shims and control surfaces.
//!
//! Both talk the same socket: shims report page loads and input events,
//! control surfaces issue recording commands. Observer control frames go
//! out to every connected shim over a broadcast channel; everything
//! inbound is decoded here and funneled into one mpsc stream so the
//! session loop sees a single ordered sequence of frames.

use futures::{SinkExt, StreamExt};
use spoor_common::protocol::{CaptureMessage, Command, CommandAck, ObserverControl};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

/// One decoded inbound frame. Commands carry a reply slot so the
/// acknowledgement goes back on the issuing connection only.
pub enum Inbound {
    Capture(CaptureMessage),
    Command(Command, oneshot::Sender<Option<CommandAck>>),
}

pub struct RelayServer {
    port: u16,
    control_tx: broadcast::Sender<ObserverControl>,
}

pub struct ServerHandle {
    pub control_tx: broadcast::Sender<ObserverControl>,
    pub inbound_tx: mpsc::Sender<Inbound>,
    pub inbound_rx: mpsc::Receiver<Inbound>,
    /// Actual bound address; port 0 in the config picks an ephemeral one.
    pub local_addr: SocketAddr,
}

impl RelayServer {
    pub fn new(port: u16) -> Self {
        let (control_tx, _) = broadcast::channel(16);
        Self { port, control_tx }
    }

    /// Bind and start accepting connections. The returned handle owns the
    /// inbound stream and the observer control broadcast.
    pub async fn start(&self) -> Result<ServerHandle, std::io::Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("relay listening on {}", local_addr);

        let (inbound_tx, inbound_rx) = mpsc::channel(100);
        let control_tx = self.control_tx.clone();

        let accept_control = control_tx.clone();
        let accept_inbound = inbound_tx.clone();
        tokio::spawn(async move {
            while let Ok((stream, peer)) = listener.accept().await {
                info!("capture connection from {}", peer);
                tokio::spawn(handle_connection(
                    stream,
                    accept_control.subscribe(),
                    accept_inbound.clone(),
                ));
            }
        });

        Ok(ServerHandle { control_tx, inbound_tx, inbound_rx, local_addr })
    }
}

async fn handle_connection(
    stream: TcpStream,
    mut control_rx: broadcast::Receiver<ObserverControl>,
    inbound_tx: mpsc::Sender<Inbound>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("websocket handshake failed: {}", e);
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            control = control_rx.recv() => {
                let control = match control {
                    Ok(c) => c,
                    // Lagged receivers resubscribe implicitly on next recv.
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let json = match serde_json::to_string(&control) {
                    Ok(j) => j,
                    Err(e) => {
                        error!("failed to encode control frame: {}", e);
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }

            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if !route_frame(&text, &inbound_tx, &mut ws_sender).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        error!("websocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Decode one text frame and forward it. Returns false when the session
/// side is gone and the connection should close.
async fn route_frame<W>(
    text: &str,
    inbound_tx: &mpsc::Sender<Inbound>,
    ws_sender: &mut W,
) -> bool
where
    W: SinkExt<Message> + Unpin,
{
    if let Ok(command) = serde_json::from_str::<Command>(text) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if inbound_tx.send(Inbound::Command(command, reply_tx)).await.is_err() {
            return false;
        }
        if let Ok(Some(ack)) = reply_rx.await {
            match serde_json::to_string(&ack) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        return false;
                    }
                }
                Err(e) => error!("failed to encode ack: {}", e),
            }
        }
        return true;
    }

    if let Ok(capture) = serde_json::from_str::<CaptureMessage>(text) {
        return inbound_tx.send(Inbound::Capture(capture)).await.is_ok();
    }

    // Unknown frames are dropped; the sender gets no error back.
    debug!("ignoring undecodable frame: {}", text);
    true
}
