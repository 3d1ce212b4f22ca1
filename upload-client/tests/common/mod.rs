// Not every util is used in every test, so we allow dead code
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use upload_client::{
    Credential, CredentialIssuanceError, CredentialIssuer, ProgressSender, SelectedFile,
    TransferError, TransferExecutor, TransferProgress, TransferRequest, UploadOrchestrator,
    UploadState,
};
use url::Url;

pub const MIB: usize = 1024 * 1024;

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// A picked file of `size` bytes
pub fn test_file(name: &str, content_type: &str, size: usize) -> SelectedFile {
    SelectedFile::new(name, content_type, vec![7u8; size])
}

/// Credential as a backend would issue it
pub fn credential(upload_url: &str, file_url: &str) -> Credential {
    Credential {
        write_url: Url::parse(upload_url).unwrap(),
        read_url: file_url.to_string(),
        object_key: None,
        expires_at_epoch_seconds: None,
    }
}

/// Issuer answering from a queue of canned results
#[derive(Default)]
pub struct MockIssuer {
    responses: Mutex<VecDeque<Result<Credential, CredentialIssuanceError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockIssuer {
    pub fn new(responses: Vec<Result<Credential, CredentialIssuanceError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialIssuer for MockIssuer {
    async fn issue(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<Credential, CredentialIssuanceError> {
        self.calls
            .lock()
            .unwrap()
            .push((file_name.to_string(), content_type.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected credential request")
    }
}

/// One scripted transfer: fractions of the body reported as sent, then the outcome
pub struct ScriptedTransfer {
    pub progress_percents: Vec<u64>,
    pub outcome: Result<(), TransferError>,
}

impl ScriptedTransfer {
    pub fn succeeds() -> Self {
        Self {
            progress_percents: vec![0, 25, 50, 75, 100],
            outcome: Ok(()),
        }
    }

    pub fn rejected(status: u16, body: &str, progress_percents: Vec<u64>) -> Self {
        Self {
            progress_percents,
            outcome: Err(TransferError::Rejected {
                status,
                body: body.to_string(),
            }),
        }
    }
}

/// Executor replaying scripted transfers
#[derive(Default)]
pub struct MockExecutor {
    script: Mutex<VecDeque<ScriptedTransfer>>,
    requests: Mutex<Vec<TransferRequest>>,
}

impl MockExecutor {
    pub fn new(script: Vec<ScriptedTransfer>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<TransferRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferExecutor for MockExecutor {
    async fn transfer(
        &self,
        request: TransferRequest,
        progress: ProgressSender,
    ) -> Result<(), TransferError> {
        let total_bytes = request.body.len() as u64;
        self.requests.lock().unwrap().push(request);
        let scripted = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected transfer");

        for percent in scripted.progress_percents {
            progress
                .send(TransferProgress {
                    bytes_sent: total_bytes * percent / 100,
                    total_bytes,
                })
                .unwrap();
            tokio::task::yield_now().await;
        }

        scripted.outcome
    }
}

/// Records every state the orchestrator publishes
pub fn record_states(orchestrator: &mut UploadOrchestrator) -> Arc<Mutex<Vec<UploadState>>> {
    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&states);
    orchestrator.on_state_change(move |state| sink.lock().unwrap().push(state.clone()));
    states
}

/// Percent values of all recorded `Transferring` states
pub fn transferring_percents(states: &[UploadState]) -> Vec<u8> {
    states
        .iter()
        .filter_map(|state| match state {
            UploadState::Transferring(percent) => Some(*percent),
            _ => None,
        })
        .collect()
}

/// Executor that reports half the body as sent and then never completes
#[derive(Default)]
pub struct HangingExecutor;

#[async_trait]
impl TransferExecutor for HangingExecutor {
    async fn transfer(
        &self,
        request: TransferRequest,
        progress: ProgressSender,
    ) -> Result<(), TransferError> {
        let total_bytes = request.body.len() as u64;
        progress
            .send(TransferProgress {
                bytes_sent: total_bytes / 2,
                total_bytes,
            })
            .unwrap();
        std::future::pending().await
    }
}

/// Issuer that never answers
#[derive(Default)]
pub struct HangingIssuer;

#[async_trait]
impl CredentialIssuer for HangingIssuer {
    async fn issue(
        &self,
        _file_name: &str,
        _content_type: &str,
    ) -> Result<Credential, CredentialIssuanceError> {
        std::future::pending().await
    }
}
