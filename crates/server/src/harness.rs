//! Line-delimited JSON over stdin/stdout.
//!
//! Each input line is a [`ClientMessage`]; each output line is an
//! [`Envelope`]. Malformed lines and rejected commands produce no output.

use anyhow::Result;
use combat_runtime::{ClientMessage, CommandOutcome, Envelope, RuntimeHandle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Feeds every input line to the runtime until EOF.
pub async fn pump_commands<R>(handle: &RuntimeHandle, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message: ClientMessage = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                warn!(target: "server", error = %e, "dropping malformed command line");
                continue;
            }
        };
        let command = message.command.name();
        let player = message.player_id;
        match handle.submit(message).await? {
            CommandOutcome::Applied { combat_id } => {
                debug!(target: "server", %player, command, %combat_id, "applied");
            }
            CommandOutcome::Rejected { code, .. } => {
                debug!(target: "server", %player, command, code, "rejected");
            }
        }
    }
    Ok(())
}

/// Writes every published envelope as one JSON line until the bus closes.
pub async fn write_envelopes<W>(mut events: broadcast::Receiver<Envelope>, mut output: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        match events.recv().await {
            Ok(envelope) => {
                let mut line = serde_json::to_vec(&envelope)?;
                line.push(b'\n');
                output.write_all(&line).await?;
                output.flush().await?;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(target: "server", skipped, "output lagged, envelopes dropped");
            }
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
