use crate::camera_config::{CameraConfigUpdate, CameraConfiguration};
use crate::config_loader::MasterConfig;
use crate::core::Dispatcher;
use crate::operations::op_helper::{build_dispatcher, to_json_line};
use crate::ptz::{DispatchResult, MotionIntent};
use anyhow::{Context, Result};
use futures::future::join_all;
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One line of session input, tagged by `op`.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum SessionRequest {
    Move {
        #[serde(default)]
        id: Option<Value>,
        #[serde(flatten)]
        intent: MotionIntent,
    },
    Config {
        #[serde(default)]
        id: Option<Value>,
        #[serde(flatten)]
        update: CameraConfigUpdate,
    },
    Show {
        #[serde(default)]
        id: Option<Value>,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionStats {
    pub moves: usize,
    pub config_updates: usize,
    pub rejected: usize,
}

fn with_id(mut value: Value, id: Option<Value>) -> Value {
    if let (Some(id), Value::Object(map)) = (id, &mut value) {
        map.insert("id".to_string(), id);
    }
    value
}

fn error_line(detail: impl std::fmt::Display, id: Option<Value>) -> Value {
    with_id(json!({ "status": "error", "detail": detail.to_string() }), id)
}

async fn move_response(
    dispatcher: &Dispatcher,
    config: Arc<CameraConfiguration>,
    intent: &MotionIntent,
    id: Option<Value>,
) -> Value {
    let protocol = config.protocol;
    match dispatcher.dispatch_with(config, intent).await {
        Ok(result) => {
            let value = serde_json::to_value(&result).unwrap_or_else(|e| error_line(e, None));
            with_id(value, id)
        }
        Err(e) => {
            let value = serde_json::to_value(DispatchResult::failed(protocol, &e))
                .unwrap_or_else(|e| error_line(e, None));
            with_id(value, id)
        }
    }
}

/// Drives a request/response session until `reader` is exhausted and returns the writer.
///
/// Moves are spawned as independent tasks and may answer out of order, each against the
/// configuration current when its line was read; config updates and `show` are applied
/// inline, in input order. A bad line gets an error response and
/// the session carries on.
pub async fn run_session<R, W>(dispatcher: Arc<Dispatcher>, reader: R, mut writer: W) -> Result<(W, SessionStats)>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

    let writer_task: JoinHandle<Result<W>> = tokio::spawn(async move {
        while let Some(value) = rx.recv().await {
            let mut line = to_json_line(&value)?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await.context("Failed to write session response")?;
            writer.flush().await.context("Failed to flush session response")?;
        }
        Ok::<W, anyhow::Error>(writer)
    });

    let mut stats = SessionStats::default();
    let mut move_tasks: Vec<JoinHandle<()>> = Vec::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read session input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("← {}", line);

        let request: SessionRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("⚠️ Rejected session line: {}", e);
                stats.rejected += 1;
                let _ = tx.send(error_line(format!("malformed request: {}", e), None));
                continue;
            }
        };

        match request {
            SessionRequest::Move { id, intent } => {
                stats.moves += 1;
                // Snapshot now so the move sees the configuration as of its own line,
                // not whatever a later config line has installed by the time it runs.
                let config = dispatcher.store().get().await;
                let dispatcher = Arc::clone(&dispatcher);
                let tx = tx.clone();
                move_tasks.push(tokio::spawn(async move {
                    let response = move_response(&dispatcher, config, &intent, id).await;
                    let _ = tx.send(response);
                }));
            }
            SessionRequest::Config { id, update } => {
                let response = match dispatcher.store().update(&update).await {
                    Ok(config) => {
                        stats.config_updates += 1;
                        with_id(json!({ "status": "ok", "config": config.masked() }), id)
                    }
                    Err(e) => {
                        stats.rejected += 1;
                        error_line(e, id)
                    }
                };
                let _ = tx.send(response);
            }
            SessionRequest::Show { id } => {
                let config = dispatcher.store().get().await;
                let _ = tx.send(with_id(json!({ "status": "ok", "config": config.masked() }), id));
            }
        }
    }

    for joined in join_all(move_tasks).await {
        if let Err(e) = joined {
            error!("💀 Move task failed (panic or cancellation): {:#}", e);
        }
    }
    drop(tx);

    let writer = writer_task.await.context("Session writer task failed")??;
    Ok((writer, stats))
}

pub async fn handle_session_cli(master_config: &MasterConfig) -> Result<()> {
    let op_start_time = Instant::now();
    let dispatcher = build_dispatcher(master_config)?;
    info!("🎮 Session started; reading JSON requests from stdin.");

    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    let (_, stats) = run_session(dispatcher, reader, tokio::io::stdout()).await?;

    info!(
        "🏁 Session ended after {:?}: {} move(s), {} config update(s), {} rejected line(s).",
        op_start_time.elapsed(),
        stats.moves,
        stats.config_updates,
        stats.rejected
    );
    Ok(())
}
