//! Fire-and-forget command dispatch.
//!
//! `CommandSender::send` queues and returns immediately.  A single task
//! executes commands in the order they were sent.  Failures are logged and
//! dropped: no retry, no reply, no local state change.  The effect of a
//! command, if any, arrives with a later snapshot.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::command::Command;

#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    pub fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("command dropped: dispatcher is gone");
        }
    }
}

pub fn spawn_dispatcher(client: ApiClient) -> (CommandSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
    let handle = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match client.execute(&command).await {
                Ok(()) => debug!("sent {}", command),
                Err(e) => warn!("command {} failed: {}", command, e),
            }
        }
        debug!("dispatcher exiting");
    });
    (CommandSender { tx }, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_commands_do_not_stop_the_dispatcher() {
        // Nothing listens on port 9; every request fails fast.
        let client = ApiClient::new("http://127.0.0.1:9/", Duration::from_millis(200)).unwrap();
        let (sender, handle) = spawn_dispatcher(client);
        sender.send(Command::set_volume("receiver-Kitchen", 10));
        sender.send(Command::DeleteRadio { id: "radio-1".into() });
        drop(sender);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
