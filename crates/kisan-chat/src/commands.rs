use kisan_stream::{
    AgentClient, AgentError, CancellationToken, CompleteResponse, EventData, EventKind,
    FinalEvent, HttpAgentClient, OutboundPayload, StreamEvent, TokenEvent,
};
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

/// Exit status for a run the user interrupted
const EXIT_INTERRUPTED: u8 = 130;

pub async fn ask(
    client: &HttpAgentClient,
    payload: OutboundPayload,
    deadline: Option<Duration>,
    raw: bool,
) -> ExitCode {
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());
    if let Some(deadline) = deadline {
        cancel_after(cancel.clone(), deadline);
    }

    let mut printer = AnswerPrinter::new(raw);
    let result = client
        .stream(&payload, |event| printer.handle(event), Some(cancel.clone()))
        .await;

    // Stops the watcher tasks; a no-op for the finished stream
    cancel.cancel();
    printer.finish();

    exit_code(result)
}

pub async fn complete(client: &HttpAgentClient, payload: OutboundPayload) -> ExitCode {
    let result = client
        .complete_as::<CompleteResponse>(&payload)
        .await
        .map(|response| {
            println!("{}", response.text);
            if let Some(intent) = response.intent.filter(|i| !i.is_empty()) {
                tracing::info!(%intent, "intent detected");
            }
        });

    exit_code(result)
}

pub async fn health(client: &HttpAgentClient) -> ExitCode {
    let result = client.health().await.map(|()| println!("ok"));
    exit_code(result)
}

fn exit_code(result: Result<(), AgentError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_aborted() => {
            tracing::debug!("request cancelled");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            tracing::error!(error = %e, status = ?e.status(), "agent request failed");
            if let Some(message) = e.user_message() {
                eprintln!("{}", message);
            }
            ExitCode::FAILURE
        }
    }
}

fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    cancel.cancel();
                }
            }
            _ = cancel.cancelled() => {}
        }
    });
}

fn cancel_after(cancel: CancellationToken, deadline: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(deadline) => {
                tracing::warn!(secs = deadline.as_secs(), "deadline reached, cancelling stream");
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    });
}

/// Writes streamed events to the terminal
struct AnswerPrinter {
    raw: bool,
    tokens: usize,
}

impl AnswerPrinter {
    fn new(raw: bool) -> Self {
        Self { raw, tokens: 0 }
    }

    fn handle(&mut self, event: StreamEvent) {
        if self.raw {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{}", line);
            }
            return;
        }

        match event.kind() {
            EventKind::Token => {
                let text = match (&event.data, event.parse_as::<TokenEvent>()) {
                    (_, Some(token)) => token.text,
                    (EventData::Text(raw), None) => raw.clone(),
                    (EventData::Json(_), None) => return,
                };
                self.tokens += 1;
                print!("{}", text);
                let _ = std::io::stdout().flush();
            }
            EventKind::Final => {
                if self.tokens == 0 {
                    if let Some(answer) = event.parse_as::<FinalEvent>() {
                        print!("{}", answer.text);
                        self.tokens += 1;
                    }
                }
            }
            EventKind::Error => {
                let detail = event
                    .data
                    .as_json()
                    .and_then(|v| v.get("error"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .or_else(|| event.data.as_text().map(str::to_string))
                    .unwrap_or_default();
                eprintln!("assistant error: {}", detail);
            }
            EventKind::Other => {
                tracing::debug!(event = %event.event, "ignoring event");
            }
        }
    }

    fn finish(&self) {
        if !self.raw && self.tokens > 0 {
            println!();
        }
    }
}
