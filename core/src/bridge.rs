//! Renderer Bridge
//!
//! The agent-side owner of the renderer subprocess. The bridge launches the
//! renderer, pumps its stdout through the line codec into the correlation
//! table, pumps outbound messages to its stdin, and multiplexes concurrent
//! `send`/`request` callers.
//!
//! # Concurrency
//!
//! Reads and writes are independent directions of the pipe and are pumped
//! by independent tasks - a blocked `request` can never deadlock a
//! concurrent `send`. The only mutual exclusion is a small async gate
//! around "assign id, register, write" so that unit stays atomic across
//! concurrent callers.
//!
//! # Supervision
//!
//! A renderer exit or read error cancels every outstanding request with
//! `TransportClosed`, then the bridge respawns the renderer with bounded
//! exponential backoff. When the restart budget runs out the bridge goes
//! `Failed` and every further call fails fast with `TransportUnavailable`.
//! `shutdown` closes the child's stdin so it can observe end-of-input and
//! exit on its own; the child is killed if it overstays, never leaked.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::codec;
use crate::correlation::CorrelationTable;
use crate::error::RequestError;
use crate::events::{
    ConfirmReply, EventBody, FormReply, InputReply, RendererEvent, SelectReply,
};
use crate::messages::{
    AlertLevel, AlertPayload, CodePayload, ConfirmPayload, FormPayload, InputPayload,
    MarkdownPayload, MessageId, ProgressPayload, QuitPayload, SelectOption, SelectPayload,
    TablePayload, TextPayload, UiBody, UiMessage,
};

/// Reason string used when cancelling pending requests on teardown.
const TRANSPORT_CLOSED: &str = "transport closed";

/// Configuration for launching and supervising the renderer.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Renderer executable.
    pub program: PathBuf,
    /// Extra arguments (mode flags only; the bridge adds `--theme`).
    pub args: Vec<String>,
    /// Theme id or palette file path passed to the renderer.
    pub theme: Option<String>,
    /// Default deadline for `request` calls.
    pub request_timeout: Duration,
    /// Capacity of the outbound write queue.
    pub queue_capacity: usize,
    /// How many times a dead renderer is relaunched before giving up.
    pub max_restarts: u32,
    /// Initial relaunch backoff; doubles per attempt.
    pub restart_backoff: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("limelight-tui"),
            args: Vec::new(),
            theme: None,
            request_timeout: Duration::from_secs(30),
            queue_capacity: 64,
            max_restarts: 2,
            restart_backoff: Duration::from_millis(250),
        }
    }
}

impl BridgeConfig {
    /// Build a config from the environment.
    ///
    /// Honors `LIMELIGHT_RENDERER` (executable path), `LIMELIGHT_THEME`
    /// (theme id or palette file), and `LIMELIGHT_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(program) = std::env::var("LIMELIGHT_RENDERER") {
            if !program.is_empty() {
                config.program = PathBuf::from(program);
            }
        }
        if let Ok(theme) = std::env::var("LIMELIGHT_THEME") {
            if !theme.is_empty() {
                config.theme = Some(theme);
            }
        }
        if let Ok(ms) = std::env::var("LIMELIGHT_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                config.request_timeout = Duration::from_millis(ms);
            }
        }
        config
    }
}

/// Lifecycle state of the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeState {
    /// Renderer is up and both pumps are running.
    Connected,
    /// Renderer died; a restart may be in progress.
    Disconnected,
    /// Restart budget exhausted; calls fail fast.
    Failed,
    /// `shutdown` was called.
    Closed,
}

/// Agent-side handle to the renderer process.
pub struct RendererBridge {
    table: Arc<CorrelationTable>,
    out_tx: mpsc::Sender<String>,
    state: Arc<Mutex<BridgeState>>,
    write_gate: AsyncMutex<()>,
    request_timeout: Duration,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl RendererBridge {
    /// Launch the renderer subprocess and start supervising it.
    pub fn spawn(config: BridgeConfig) -> Self {
        let table = Arc::new(CorrelationTable::new());
        let (out_tx, out_rx) = mpsc::channel::<String>(config.queue_capacity);
        let state = Arc::new(Mutex::new(BridgeState::Disconnected));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let supervisor = tokio::spawn(supervise(
            config.clone(),
            Arc::clone(&table),
            out_rx,
            Arc::clone(&state),
            shutdown_rx,
        ));

        Self {
            table,
            out_tx,
            state,
            write_gate: AsyncMutex::new(()),
            request_timeout: config.request_timeout,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            supervisor: Mutex::new(Some(supervisor)),
        }
    }

    /// Attach the bridge to an already-open stream pair instead of a
    /// subprocess. No restarts: end-of-input tears the transport down for
    /// good. Used for tests and embedded setups.
    pub fn from_streams<R, W>(reader: R, writer: W, config: BridgeConfig) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let table = Arc::new(CorrelationTable::new());
        let (out_tx, out_rx) = mpsc::channel::<String>(config.queue_capacity);
        let state = Arc::new(Mutex::new(BridgeState::Connected));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let supervisor = tokio::spawn(pump_streams(
            reader,
            writer,
            Arc::clone(&table),
            out_rx,
            Arc::clone(&state),
            shutdown_rx,
        ));

        Self {
            table,
            out_tx,
            state,
            write_gate: AsyncMutex::new(()),
            request_timeout: config.request_timeout,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            supervisor: Mutex::new(Some(supervisor)),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        *self.state.lock()
    }

    /// Number of requests awaiting replies.
    pub fn pending_requests(&self) -> usize {
        self.table.len()
    }

    fn ensure_available(&self) -> Result<(), RequestError> {
        match self.state() {
            BridgeState::Failed => Err(RequestError::TransportUnavailable(
                "renderer restart budget exhausted".into(),
            )),
            BridgeState::Closed => Err(RequestError::TransportUnavailable(
                "bridge is shut down".into(),
            )),
            BridgeState::Connected | BridgeState::Disconnected => Ok(()),
        }
    }

    /// Fire-and-forget: encode and enqueue one display message. Suspends
    /// only while enqueueing; an encoding failure surfaces immediately and
    /// never reaches the wire.
    pub async fn send(&self, body: UiBody) -> Result<(), RequestError> {
        self.ensure_available()?;
        let line = codec::encode_line(&UiMessage::display(body))
            .map_err(|e| RequestError::Encoding(e.to_string()))?;
        self.out_tx
            .send(line)
            .await
            .map_err(|_| RequestError::TransportClosed(TRANSPORT_CLOSED.into()))
    }

    /// Send a request and await its reply with the default deadline.
    pub async fn request(&self, body: UiBody) -> Result<serde_json::Value, RequestError> {
        self.request_with_timeout(body, self.request_timeout).await
    }

    /// Send a request and await its reply.
    ///
    /// Exactly one of {reply payload, `Timeout`, `TransportClosed`} reaches
    /// the caller. On timeout the pending entry is removed first, so a late
    /// reply is dropped by the correlation table.
    pub async fn request_with_timeout(
        &self,
        body: UiBody,
        timeout: Duration,
    ) -> Result<serde_json::Value, RequestError> {
        self.ensure_available()?;
        let id = MessageId::new();
        let line = codec::encode_line(&UiMessage {
            id: Some(id.clone()),
            body,
        })
        .map_err(|e| RequestError::Encoding(e.to_string()))?;

        let handle = {
            let _gate = self.write_gate.lock().await;
            let handle = self
                .table
                .register(&id)
                .map_err(|e| RequestError::Protocol(e.to_string()))?;
            if self.out_tx.send(line).await.is_err() {
                self.table.remove(&id);
                return Err(RequestError::TransportClosed(TRANSPORT_CLOSED.into()));
            }
            handle
        };

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(RequestError::TransportClosed(TRANSPORT_CLOSED.into())),
            Err(_) => {
                self.table.remove(&id);
                Err(RequestError::Timeout(timeout))
            }
        }
    }

    /// Display a paragraph of text.
    pub async fn send_text(&self, content: impl Into<String>) -> Result<(), RequestError> {
        self.send(UiBody::Text(TextPayload {
            content: content.into(),
        }))
        .await
    }

    /// Display markdown-flavored text.
    pub async fn send_markdown(&self, content: impl Into<String>) -> Result<(), RequestError> {
        self.send(UiBody::Markdown(MarkdownPayload {
            content: content.into(),
        }))
        .await
    }

    /// Display a level-colored alert.
    pub async fn send_alert(
        &self,
        level: AlertLevel,
        title: Option<String>,
        message: impl Into<String>,
    ) -> Result<(), RequestError> {
        self.send(UiBody::Alert(AlertPayload {
            level,
            title,
            message: message.into(),
        }))
        .await
    }

    /// Display or update a progress bar. `total == 0` shows indeterminate
    /// activity.
    pub async fn send_progress(
        &self,
        label: Option<String>,
        current: f64,
        total: f64,
    ) -> Result<(), RequestError> {
        self.send(UiBody::Progress(ProgressPayload {
            label,
            current,
            total,
        }))
        .await
    }

    /// Display a data table.
    pub async fn show_table(
        &self,
        title: Option<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<(), RequestError> {
        self.send(UiBody::Table(TablePayload {
            title,
            columns,
            rows,
        }))
        .await
    }

    /// Display a source listing.
    pub async fn show_code(
        &self,
        title: Option<String>,
        language: Option<String>,
        content: impl Into<String>,
    ) -> Result<(), RequestError> {
        self.send(UiBody::Code(CodePayload {
            title,
            language,
            content: content.into(),
        }))
        .await
    }

    /// Ask a yes/no question and await the answer.
    pub async fn request_confirm(
        &self,
        message: impl Into<String>,
    ) -> Result<ConfirmReply, RequestError> {
        let payload = self
            .request(UiBody::Confirm(ConfirmPayload {
                message: message.into(),
                yes_label: None,
                no_label: None,
            }))
            .await?;
        serde_json::from_value(payload).map_err(|e| RequestError::BadReply(e.to_string()))
    }

    /// Show a form and await the submitted values.
    pub async fn request_form(&self, form: FormPayload) -> Result<FormReply, RequestError> {
        let payload = self.request(UiBody::Form(form)).await?;
        serde_json::from_value(payload).map_err(|e| RequestError::BadReply(e.to_string()))
    }

    /// Show a picker and await the chosen values.
    pub async fn request_select(
        &self,
        title: Option<String>,
        options: Vec<SelectOption>,
        multi: bool,
    ) -> Result<SelectReply, RequestError> {
        let payload = self
            .request(UiBody::Select(SelectPayload {
                title,
                options,
                multi,
            }))
            .await?;
        serde_json::from_value(payload).map_err(|e| RequestError::BadReply(e.to_string()))
    }

    /// Prompt for one line of text and await it.
    pub async fn request_input(&self, input: InputPayload) -> Result<InputReply, RequestError> {
        let payload = self.request(UiBody::Input(input)).await?;
        serde_json::from_value(payload).map_err(|e| RequestError::BadReply(e.to_string()))
    }

    /// Tell the renderer to exit, optionally with a goodbye line.
    pub async fn quit(&self, message: Option<String>) -> Result<(), RequestError> {
        self.send(UiBody::Quit(QuitPayload { message })).await
    }

    /// Tear the bridge down: cancel outstanding requests, close the
    /// renderer's stdin so it can exit on end-of-input, and reap it.
    pub async fn shutdown(&self) {
        *self.state.lock() = BridgeState::Closed;
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }
        let handle = self.supervisor.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.table.cancel_all(TRANSPORT_CLOSED);
    }
}

/// Decode one renderer line and route it into the correlation table.
fn handle_event_line(table: &CorrelationTable, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    match codec::decode_line::<RendererEvent>(line) {
        Ok(event) => match (event.id, event.body) {
            (Some(id), EventBody::Reply(payload)) => {
                table.complete(&id, Ok(payload));
            }
            (Some(id), EventBody::Error(err)) => {
                table.complete(&id, Err(RequestError::Renderer(err.message)));
            }
            (None, EventBody::Error(err)) => {
                tracing::warn!(error = %err.message, "renderer reported an error");
            }
            (None, EventBody::Reply(_)) => {
                tracing::warn!("renderer sent a reply without an id; dropped");
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "undecodable renderer event; dropped");
        }
    }
}

/// Pump a fixed stream pair until end-of-input or shutdown. No restarts.
async fn pump_streams<R, W>(
    reader: R,
    writer: W,
    table: Arc<CorrelationTable>,
    out_rx: mpsc::Receiver<String>,
    state: Arc<Mutex<BridgeState>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let writer_task = spawn_writer(writer, out_rx, cancel_rx);
    let reader_task = spawn_reader(reader, Arc::clone(&table));

    tokio::select! {
        _ = &mut shutdown_rx => {}
        _ = reader_task => {}
    }

    let _ = cancel_tx.send(());
    let _ = tokio::time::timeout(Duration::from_secs(2), writer_task).await;
    {
        let mut state = state.lock();
        if *state != BridgeState::Closed {
            *state = BridgeState::Disconnected;
        }
    }
    table.cancel_all(TRANSPORT_CLOSED);
}

/// Drain the outbound queue into the renderer's stdin, one line at a time.
///
/// Exits on cancel, queue closure, or a write error, and hands the queue
/// receiver back so a relaunched renderer keeps the same outbound queue.
/// Dropping the writer closes the renderer's stdin.
fn spawn_writer<W>(
    mut writer: W,
    mut out_rx: mpsc::Receiver<String>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> JoinHandle<mpsc::Receiver<String>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let line = tokio::select! {
                _ = &mut cancel_rx => break,
                line = out_rx.recv() => match line {
                    Some(line) => line,
                    None => break,
                },
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
        out_rx
    })
}

/// Read renderer stdout line by line into the correlation table.
fn spawn_reader<R>(reader: R, table: Arc<CorrelationTable>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => handle_event_line(&table, &line),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "renderer read error");
                    break;
                }
            }
        }
    })
}

/// Launch, pump, and relaunch the renderer subprocess until shutdown or
/// the restart budget runs out.
async fn supervise(
    config: BridgeConfig,
    table: Arc<CorrelationTable>,
    mut out_rx: mpsc::Receiver<String>,
    state: Arc<Mutex<BridgeState>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut restarts = 0u32;
    let mut backoff = config.restart_backoff;

    loop {
        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(theme) = &config.theme {
            command.arg("--theme").arg(theme);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(program = %config.program.display(), error = %e, "failed to launch renderer");
                *state.lock() = BridgeState::Failed;
                table.cancel_all(TRANSPORT_CLOSED);
                return;
            }
        };

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
            tracing::error!("renderer launched without piped stdio");
            *state.lock() = BridgeState::Failed;
            table.cancel_all(TRANSPORT_CLOSED);
            return;
        };

        *state.lock() = BridgeState::Connected;
        tracing::info!(program = %config.program.display(), "renderer launched");

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let writer_task = spawn_writer(stdin, out_rx, cancel_rx);
        let reader_task = spawn_reader(stdout, Arc::clone(&table));

        let shutting_down = tokio::select! {
            _ = &mut shutdown_rx => true,
            _ = reader_task => false,
        };

        // Stopping the writer drops the child's stdin, which is the EOF the
        // renderer exits on.
        let _ = cancel_tx.send(());
        out_rx = match tokio::time::timeout(Duration::from_secs(2), writer_task).await {
            Ok(Ok(rx)) => rx,
            _ => {
                tracing::warn!("writer task did not stop cleanly; outbound queue reset");
                let (_, rx) = mpsc::channel(1);
                rx
            }
        };

        if shutting_down {
            match tokio::time::timeout(Duration::from_secs(2), child.wait()).await {
                Ok(_) => {}
                Err(_) => {
                    let _ = child.kill().await;
                }
            }
            table.cancel_all(TRANSPORT_CLOSED);
            return;
        }

        let _ = child.kill().await;
        table.cancel_all(TRANSPORT_CLOSED);
        *state.lock() = BridgeState::Disconnected;

        if restarts >= config.max_restarts {
            tracing::error!(restarts, "renderer restart budget exhausted");
            *state.lock() = BridgeState::Failed;
            return;
        }
        restarts += 1;
        tracing::warn!(attempt = restarts, backoff_ms = backoff.as_millis() as u64, "renderer died; relaunching");
        tokio::time::sleep(backoff).await;
        backoff = backoff.saturating_mul(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn config_defaults_are_sane() {
        let config = BridgeConfig::default();
        assert_eq!(config.program, PathBuf::from("limelight-tui"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_restarts, 2);
    }

    #[tokio::test]
    async fn event_lines_route_into_the_table() {
        let table = CorrelationTable::new();
        let id = MessageId("r1".into());
        let rx = table.register(&id).unwrap();

        handle_event_line(&table, r#"{"id":"r1","kind":"reply","payload":{"confirmed":true}}"#);
        assert_eq!(rx.await.unwrap().unwrap(), json!({"confirmed": true}));
    }

    #[tokio::test]
    async fn error_events_fail_the_pending_request() {
        let table = CorrelationTable::new();
        let id = MessageId("r1".into());
        let rx = table.register(&id).unwrap();

        handle_event_line(
            &table,
            r#"{"id":"r1","kind":"error","payload":{"message":"unrecognized kind"}}"#,
        );
        match rx.await.unwrap() {
            Err(RequestError::Renderer(msg)) => assert_eq!(msg, "unrecognized kind"),
            other => panic!("expected Renderer error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_lines_are_dropped_quietly() {
        let table = CorrelationTable::new();
        handle_event_line(&table, "not json at all");
        handle_event_line(&table, "");
        handle_event_line(&table, r#"{"kind":"reply","payload":{}}"#);
        assert!(table.is_empty());
    }
}
