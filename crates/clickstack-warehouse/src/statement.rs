// Statement submission with bounded completion polling

use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{StatementClient, WarehouseTarget};

const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Polling budget in whole poll intervals
const POLL_BUDGET: u32 = 150;

#[derive(Debug, Error)]
pub enum StatementError {
    /// The statement reached the FAILED state; carries the last status payload
    #[error("statement {statement_id} failed: {payload}")]
    Failed {
        statement_id: String,
        payload: String,
    },

    /// No terminal state within the polling budget
    #[error("statement {statement_id} still '{last_status}' after {waited_secs}s")]
    Timeout {
        statement_id: String,
        last_status: String,
        waited_secs: u64,
    },

    /// Submission or status-check failure, propagated unchanged
    #[error(transparent)]
    Service(#[from] anyhow::Error),
}

/// Submit statements to the target and return the statement id.
///
/// A single statement goes through the single-statement API; two or more go
/// through the batch API. An empty list submits nothing and returns None.
/// Submission failures propagate immediately - there are no retries here.
pub async fn execute_statements(
    client: &dyn StatementClient,
    statements: &[String],
    target: &WarehouseTarget,
) -> Result<Option<String>, StatementError> {
    info!("executing {} statement(s) in {}", statements.len(), target.identity());
    if statements.is_empty() {
        warn!("no statements to execute");
        return Ok(None);
    }

    let statement_id = if statements.len() == 1 {
        client.execute(&statements[0], target).await?
    } else {
        client.batch_execute(statements, target).await?
    };
    info!(
        "got statement id {statement_id} after submitting to {}",
        target.identity()
    );
    Ok(Some(statement_id))
}

/// Submit statements and poll until FINISHED, failing on FAILED or when the
/// budget runs out.
pub async fn execute_statements_with_wait(
    client: &dyn StatementClient,
    statements: &[String],
    target: &WarehouseTarget,
) -> Result<(), StatementError> {
    let Some(statement_id) = execute_statements(client, statements, target).await? else {
        return Ok(());
    };

    let mut status = client.describe(&statement_id).await?;
    info!("statement {statement_id} status: {}", status.status);
    let mut waited = 0u32;
    while !status.is_finished() && !status.is_failed() && waited < POLL_BUDGET {
        tokio::time::sleep(POLL_INTERVAL).await;
        waited += 1;
        status = client.describe(&statement_id).await?;
        info!("statement {statement_id} status: {}", status.status);
    }

    if status.is_failed() {
        let payload = status.payload();
        error!("statement {statement_id} failed: {payload}");
        return Err(StatementError::Failed {
            statement_id,
            payload,
        });
    }
    if !status.is_finished() {
        return Err(StatementError::Timeout {
            statement_id,
            last_status: status.status,
            waited_secs: u64::from(waited) * POLL_INTERVAL.as_secs(),
        });
    }
    Ok(())
}
