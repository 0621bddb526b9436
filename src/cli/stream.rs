//! Word-by-word answer reveal.

use crate::config::ChatSettings;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

const CURSOR: &str = "▌";
const ERASE_CURSOR: &str = "\x08 \x08";

/// Types out a finished answer one word at a time behind a block cursor.
///
/// Purely presentational: the answer is complete before streaming starts.
#[derive(Debug, Clone, Copy)]
pub struct WordStreamer {
    delay: Duration,
}

impl WordStreamer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self::new(Duration::from_millis(settings.word_delay_ms))
    }

    /// Write `text` to `out`, pausing between words. Returns the revealed text.
    pub async fn stream<W: Write>(&self, out: &mut W, text: &str) -> std::io::Result<String> {
        debug!(state = "StreamResponse", words = text.split_whitespace().count());
        let mut revealed = String::with_capacity(text.len());

        for word in text.split_whitespace() {
            revealed.push_str(word);
            revealed.push(' ');

            write!(out, "{} {}", word, CURSOR)?;
            out.flush()?;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            write!(out, "{}", ERASE_CURSOR)?;
        }

        writeln!(out)?;
        out.flush()?;
        Ok(revealed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Capture debug logs on the current thread until the guard drops.
    pub(crate) fn capture_logs() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (tracing::subscriber::set_default(subscriber), buffer)
    }

    #[tokio::test]
    async fn test_stream_traces_response_state() {
        let (_guard, logs) = capture_logs();
        WordStreamer::new(Duration::ZERO)
            .stream(&mut Vec::new(), "A bit is a binary digit.")
            .await
            .unwrap();
        assert!(logs.contents().contains("StreamResponse"));
    }

    #[tokio::test]
    async fn test_stream_reveals_every_word_in_order() {
        let mut out = Vec::new();
        let revealed = WordStreamer::new(Duration::ZERO)
            .stream(&mut out, "Hello  student,\nlet's talk\tabout loops.")
            .await
            .unwrap();

        assert_eq!(revealed, "Hello student, let's talk about loops. ");

        let raw = String::from_utf8(out).unwrap();
        assert_eq!(raw.matches(CURSOR).count(), 6);
        let settled = raw.replace(&format!("{}{}", CURSOR, ERASE_CURSOR), "");
        assert_eq!(settled, "Hello student, let's talk about loops. \n");
    }

    #[tokio::test]
    async fn test_stream_empty_answer() {
        let mut out = Vec::new();
        let revealed = WordStreamer::new(Duration::ZERO)
            .stream(&mut out, "   ")
            .await
            .unwrap();
        assert!(revealed.is_empty());
        assert_eq!(out, b"\n");
    }

    #[tokio::test]
    async fn test_stream_waits_between_words() {
        let start = std::time::Instant::now();
        let mut out = Vec::new();
        WordStreamer::new(Duration::from_millis(50))
            .stream(&mut out, "one two three")
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
