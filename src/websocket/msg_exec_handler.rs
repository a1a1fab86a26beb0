use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::clients::exec_client::{self, ExecRun};
use crate::models::{ExecutePayload, ExecutionOutput, ServerEvent};
use crate::state::AppState;

/// Result text when a run produces neither stdout nor stderr.
const NO_OUTPUT_TEXT: &str = "Code executed with no output";

/// Result text when the gateway itself fails; the failure never surfaces as
/// a hub error.
const GATEWAY_FAILURE_TEXT: &str = "Code execution service is unavailable, please try again later";

/// Delegate a code run to the external gateway.
///
/// Runs detached: a pending execution never blocks other inbound events, and
/// the requester disconnecting does not abort it. The result goes to
/// whoever is connected when it resolves.
pub fn handle_execute_code(payload: ExecutePayload, connection_id: Uuid, app_state: Arc<AppState>) {
    tokio::spawn(async move {
        let started = Instant::now();
        let language = app_state.store.code_language().await;
        info!("Executing {} code for session {}", language, connection_id);

        let result = match exec_client::get_exec_gateway_client() {
            Some(client) => client
                .execute(&language, &payload.code)
                .await
                .map_err(|e| e.to_string()),
            None => Err("execution gateway client not initialized".to_string()),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (output, is_error) = match result {
            Ok(run) => classify_run(&run),
            Err(e) => {
                error!("Execution gateway failure: {}", e);
                (GATEWAY_FAILURE_TEXT.to_string(), true)
            }
        };

        let output = ExecutionOutput { output, is_error, elapsed_ms };
        app_state.store.record_execution_result(output.clone()).await;
        app_state
            .hub
            .publish(Some(connection_id), ServerEvent::ExecutionResult(output));
    });
}

/// Classify a completed run: any stderr wins, then stdout, then a fixed
/// no-output notice.
fn classify_run(run: &ExecRun) -> (String, bool) {
    if !run.stderr.is_empty() {
        (run.stderr.clone(), true)
    } else if !run.stdout.is_empty() {
        (run.stdout.clone(), false)
    } else {
        (NO_OUTPUT_TEXT.to_string(), false)
    }
}
