use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::MissedTickBehavior,
};
use tracing::{debug, info};

use crate::{
    protocol::{ClientId, ClientMessage, Outbound},
    service::GameService,
    world::GameState,
};

enum Command {
    Client {
        from: ClientId,
        message: ClientMessage,
    },
    Snapshot(oneshot::Sender<GameState>),
}

/// Cloneable handle to the control task that owns the [`GameService`].
#[derive(Clone)]
pub struct GameHandle {
    commands: mpsc::Sender<Command>,
    outbound: broadcast::Sender<Arc<Outbound>>,
}

#[derive(Debug, thiserror::Error)]
#[error("the game control loop has stopped")]
pub struct ControlLoopStopped;

impl GameHandle {
    /// Starts the control loop on the current tokio runtime.
    pub fn spawn(service: GameService, tick: Duration) -> Self {
        let (commands, receiver) = mpsc::channel(256);
        let (outbound, _) = broadcast::channel(512);
        tokio::spawn(control_loop(service, receiver, outbound.clone(), tick));
        Self { commands, outbound }
    }

    pub async fn send(&self, from: ClientId, message: ClientMessage) -> Result<(), ControlLoopStopped> {
        self.commands
            .send(Command::Client { from, message })
            .await
            .map_err(|_| ControlLoopStopped)
    }

    pub async fn snapshot(&self) -> Result<GameState, ControlLoopStopped> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| ControlLoopStopped)?;
        response.await.map_err(|_| ControlLoopStopped)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Outbound>> {
        self.outbound.subscribe()
    }
}

/// Serialises the wall-clock tick and inbound commands onto one task, so a
/// turn can never interleave with a client push.
async fn control_loop(
    mut service: GameService,
    mut commands: mpsc::Receiver<Command>,
    outbound: broadcast::Sender<Arc<Outbound>>,
    tick: Duration,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        let messages = tokio::select! {
            _ = interval.tick() => service.tick(),
            command = commands.recv() => match command {
                Some(Command::Client { from, message }) => {
                    debug!(client = from.0, "handling client message");
                    service.handle(from, message)
                }
                Some(Command::Snapshot(reply)) => {
                    let _ = reply.send(service.state().clone());
                    continue;
                }
                None => break,
            },
        };
        for message in messages {
            // No subscribers is fine: nobody is connected.
            let _ = outbound.send(Arc::new(message));
        }
    }
    info!("control loop stopped");
}
