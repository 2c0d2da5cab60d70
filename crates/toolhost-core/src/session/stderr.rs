//! Provider stderr capture shared by both transports

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStderr;
use tokio::task::JoinHandle;

use crate::log_event;
use crate::logging::{event, SharedEventLog};

/// Number of stderr lines kept for startup diagnostics
const TAIL_LINES: usize = 20;

/// How long a failed startup waits for the drain to catch the last lines
const SETTLE: Duration = Duration::from_millis(200);

/// Last few lines a provider wrote to stderr
#[derive(Debug, Clone, Default)]
pub(crate) struct StderrTail {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl StderrTail {
    fn push(&self, line: String) {
        let mut lines = self.lines.lock();
        if lines.len() == TAIL_LINES {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Tail joined into one block, or a placeholder when the provider was silent
    pub(crate) fn summary(&self) -> String {
        let joined = self.lines.lock().iter().cloned().collect::<Vec<_>>().join("\n");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            "(no stderr output)".to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub(crate) fn text(&self) -> String {
        self.lines.lock().iter().cloned().collect::<Vec<_>>().join("\n")
    }

    /// Drain `stderr` in the background, one `STDERR` event per line
    pub(crate) fn drain(&self, stderr: ChildStderr, session: &str, log: SharedEventLog) -> JoinHandle<()> {
        let tail = self.clone();
        let name = session.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log_event!(log, event::STDERR, "[{}] {}", name, line);
                tail.push(line);
            }
        })
    }
}

/// Let a drain finish reading a dying process, then stop it
pub(crate) async fn settle(mut task: JoinHandle<()>) {
    if tokio::time::timeout(SETTLE, &mut task).await.is_err() {
        task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_keeps_last_lines() {
        let tail = StderrTail::default();
        for i in 0..25 {
            tail.push(format!("line {i}"));
        }

        let text = tail.text();
        assert!(text.starts_with("line 5\n"));
        assert!(text.ends_with("line 24"));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(StderrTail::default().summary(), "(no stderr output)");
    }
}
