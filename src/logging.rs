use tracing_subscriber::fmt::MakeWriter;

/// Mirrors every formatted log line into a broadcast channel so the
/// `/api/logs` SSE endpoint can tail the daemon in real time.
#[derive(Clone)]
pub(crate) struct LogTap {
    pub sender: tokio::sync::broadcast::Sender<String>,
}

impl<'a> MakeWriter<'a> for LogTap {
    type Writer = LogTapWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogTapWriter {
            sender: self.sender.clone(),
        }
    }
}

pub(crate) struct LogTapWriter {
    sender: tokio::sync::broadcast::Sender<String>,
}

impl std::io::Write for LogTapWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let line = String::from_utf8_lossy(buf).to_string();
        let _ = self.sender.send(line); // Ignored if no receivers
        std::io::stdout().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}
