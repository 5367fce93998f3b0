use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::{Handle, Signals};
use std::io;

/// Stream of shutdown signals (Ctrl+C and SIGTERM)
pub struct ShutdownSignal {
    signals: Signals,
    handle: Handle,
}

impl ShutdownSignal {
    /// Register SIGINT and SIGTERM handlers
    pub fn install() -> io::Result<Self> {
        let signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        Ok(Self { signals, handle })
    }

    /// Wait for the next signal. `None` once the handler is closed.
    pub async fn recv(&mut self) -> Option<i32> {
        self.signals.next().await
    }
}

impl Drop for ShutdownSignal {
    fn drop(&mut self) {
        self.handle.close();
    }
}

pub fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        _ => "unknown",
    }
}
