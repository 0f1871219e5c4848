//! LSP Work Done Progress support for the initial workspace compile and
//! dependency resolution.
//!
//! A channel decouples the progress producer (the compile loop, which
//! must not block on slow client round-trips) from the transport consumer
//! (which sends `$/progress` notifications one at a time).
//!
//! ```text
//! compile loop ──ProgressUpdate──► mpsc channel ──► consumer task ──► $/progress
//! ```

use tokio::sync::mpsc;
use tower_lsp_server::Client;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::lsp_types::{
    ProgressParams, ProgressParamsValue, ProgressToken, WorkDoneProgress, WorkDoneProgressBegin,
    WorkDoneProgressEnd, WorkDoneProgressReport, request::WorkDoneProgressCreate,
    notification::Progress, WorkDoneProgressCreateParams,
};

const PROGRESS_CHANNEL_CAPACITY: usize = 8;

/// Non-blocking sender for progress updates, cheap to clone. A full or
/// closed channel silently drops the update — progress is best-effort UI
/// feedback, never something a compile should block on.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressUpdate>,
    total: usize,
}

struct ProgressUpdate {
    completed: usize,
    total: usize,
}

impl ProgressSender {
    pub fn send(&self, completed: usize) {
        let _ = self.tx.try_send(ProgressUpdate { completed, total: self.total });
    }
}

/// Owns the begin → report → end lifecycle for one long-running operation
/// (initial workspace compile, dependency resolution).
pub struct CompilationProgress {
    client: Client,
    token: ProgressToken,
    active: bool,
    _consumer_handle: tokio::task::JoinHandle<()>,
}

impl CompilationProgress {
    pub async fn start(client: Client, title: &str, total: usize) -> Result<(Self, ProgressSender)> {
        let token = ProgressToken::String(format!("groovy-compile-{title}"));

        client.send_request::<WorkDoneProgressCreate>(WorkDoneProgressCreateParams { token: token.clone() }).await?;

        client
            .send_notification::<Progress>(ProgressParams {
                token: token.clone(),
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                    title: title.to_string(),
                    message: Some(format!("compiling {total} files")),
                    cancellable: Some(false),
                    percentage: Some(0),
                })),
            })
            .await;

        let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let consumer_client = client.clone();
        let consumer_token = token.clone();
        let consumer_handle = tokio::spawn(async move {
            consume_progress_updates(rx, consumer_client, consumer_token).await;
        });

        let sender = ProgressSender { tx, total };
        Ok((Self { client, token, active: true, _consumer_handle: consumer_handle }, sender))
    }

    pub async fn end(mut self, success: bool) {
        if !self.active {
            return;
        }
        self.active = false;
        self._consumer_handle.abort();

        let message = if success { "compilation finished" } else { "compilation finished with errors" };
        self.client
            .send_notification::<Progress>(ProgressParams {
                token: self.token.clone(),
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
                    message: Some(message.to_string()),
                })),
            })
            .await;
    }
}

async fn consume_progress_updates(mut rx: mpsc::Receiver<ProgressUpdate>, client: Client, token: ProgressToken) {
    while let Some(update) = rx.recv().await {
        let percentage = if update.total > 0 { ((update.completed as f64 / update.total as f64) * 100.0) as u32 } else { 0 };

        client
            .send_notification::<Progress>(ProgressParams {
                token: token.clone(),
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::Report(WorkDoneProgressReport {
                    message: Some(format!("compiled {}/{} files", update.completed, update.total)),
                    percentage: Some(percentage),
                    cancellable: Some(false),
                })),
            })
            .await;
    }
}

impl Drop for CompilationProgress {
    fn drop(&mut self) {
        if self.active {
            tracing::warn!(token = ?self.token, "CompilationProgress dropped without end(), sending a bare End");
            self._consumer_handle.abort();
            let client = self.client.clone();
            let token = self.token.clone();
            tokio::spawn(async move {
                client
                    .send_notification::<Progress>(ProgressParams {
                        token,
                        value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd { message: None })),
                    })
                    .await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn percentage_calculation_handles_zero_total() {
        let calc = |completed: usize, total: usize| -> u32 {
            if total == 0 { return 0 }
            ((completed as f64 / total as f64) * 100.0) as u32
        };
        assert_eq!(calc(0, 0), 0);
        assert_eq!(calc(5, 10), 50);
        assert_eq!(calc(10, 10), 100);
    }

    #[tokio::test]
    async fn sending_on_a_closed_channel_does_not_panic() {
        use super::*;
        let (tx, rx) = mpsc::channel(1);
        let sender = ProgressSender { tx, total: 10 };
        drop(rx);
        sender.send(5);
    }

    #[tokio::test]
    async fn sending_on_a_full_channel_drops_silently() {
        use super::*;
        let (tx, _rx) = mpsc::channel(1);
        let sender = ProgressSender { tx, total: 10 };
        sender.send(1);
        sender.send(2);
    }
}
