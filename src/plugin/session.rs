//! The request/reply loop
//!
//! Requests are handled one at a time in arrival order: the reply to request
//! N is written and flushed before request N+1 is read.

use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use super::handler::MessageHandler;
use super::transport::{Framing, MessageReader, MessageWriter, TransportError};
use crate::protocol::HostToPluginMessage;

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub requests: u64,
    pub diagnostics: u64,
}

/// One connection between the host and this plugin
pub struct PluginSession<R, W> {
    reader: MessageReader<R>,
    writer: MessageWriter<W>,
    handler: MessageHandler,
}

impl<R: BufRead, W: Write> PluginSession<R, W> {
    pub fn new(reader: MessageReader<R>, writer: MessageWriter<W>, handler: MessageHandler) -> Self {
        Self {
            reader,
            writer,
            handler,
        }
    }

    pub fn handler(&self) -> &MessageHandler {
        &self.handler
    }

    /// Serves requests until the host closes the stream.
    ///
    /// A message that fails to decode ends the session with an error.
    pub fn run(&mut self) -> Result<SessionStats, TransportError> {
        let mut stats = SessionStats::default();

        while let Some(message) = self.reader.read::<HostToPluginMessage>()? {
            let reply = self.handler.handle(&message);
            debug!(request = message.kind(), reply = reply.kind(), "sending reply");

            stats.requests += 1;
            stats.diagnostics += reply.diagnostics().len() as u64;
            self.writer.write(&reply)?;
        }

        info!(
            requests = stats.requests,
            diagnostics = stats.diagnostics,
            "host closed the connection"
        );
        Ok(stats)
    }

    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }
}

/// Serves `handler` on this process's stdin and stdout
pub fn serve_stdio(
    handler: MessageHandler,
    framing: Framing,
    max_frame_bytes: usize,
) -> Result<SessionStats, TransportError> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    let reader = MessageReader::new(stdin.lock(), framing).with_max_frame_bytes(max_frame_bytes);
    let writer = MessageWriter::new(stdout.lock(), framing);

    PluginSession::new(reader, writer, handler).run()
}
