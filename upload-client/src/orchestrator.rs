//! Upload state machine

use std::sync::Arc;

use common_types::UploadPolicy;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    error::{UploadError, UploadErrorClass},
    issuer::CredentialIssuer,
    state::{progress_percent, SelectedFile, UploadRequest, UploadState},
    transfer::{TransferExecutor, TransferProgress, TransferRequest},
    validation::validate,
};

/// Failure message of an attempt whose future was dropped
pub const INTERRUPTED: &str = "upload interrupted";

/// Callback invoked after every state change, in order
pub type StateCallback = Box<dyn Fn(&UploadState) + Send + Sync + 'static>;

/// Drives one upload attempt at a time: validate, request a credential, transfer
///
/// Operations take `&mut self`, so a second attempt can never start while one is in flight.
/// Credentials live only inside [`UploadOrchestrator::execute`]; every attempt asks the
/// issuer for a new one.
pub struct UploadOrchestrator {
    issuer: Arc<dyn CredentialIssuer>,
    executor: Arc<dyn TransferExecutor>,
    policy: UploadPolicy,
    state: UploadState,
    file: Option<SelectedFile>,
    listeners: Vec<StateCallback>,
}

impl UploadOrchestrator {
    /// Creates an idle orchestrator with the default upload policy
    pub fn new(issuer: Arc<dyn CredentialIssuer>, executor: Arc<dyn TransferExecutor>) -> Self {
        Self {
            issuer,
            executor,
            policy: UploadPolicy::default(),
            state: UploadState::Idle,
            file: None,
            listeners: Vec::new(),
        }
    }

    /// Replaces the validation policy
    #[must_use]
    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers a callback for state changes
    pub fn on_state_change(&mut self, callback: impl Fn(&UploadState) + Send + Sync + 'static) {
        self.listeners.push(Box::new(callback));
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &UploadState {
        &self.state
    }

    /// Current progress in percent
    #[must_use]
    pub const fn progress_percent(&self) -> u8 {
        self.state.progress_percent()
    }

    /// Read URL of the uploaded object, once it exists
    #[must_use]
    pub fn read_url(&self) -> Option<&str> {
        self.state.read_url()
    }

    /// Whether a new file may be chosen
    #[must_use]
    pub const fn can_initiate(&self) -> bool {
        !self.state.is_busy()
    }

    /// Whether [`UploadOrchestrator::execute`] may be called
    #[must_use]
    pub const fn can_execute(&self) -> bool {
        matches!(self.state, UploadState::FileSelected(_)) && self.file.is_some()
    }

    fn transition(&mut self, next: UploadState) {
        debug!(from = self.state.name(), to = next.name(), "upload state change");
        self.state = next;
        for listener in &self.listeners {
            listener(&self.state);
        }
    }

    /// Selects a file and validates it synchronously
    ///
    /// Any previous result, error and progress is discarded. Ends in `FileSelected` or
    /// `Invalid`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Busy` while an attempt is in flight
    pub fn initiate(&mut self, file: Option<SelectedFile>) -> Result<&UploadState, UploadError> {
        if self.state.is_busy() {
            return Err(UploadError::Busy);
        }

        self.file = None;
        self.transition(UploadState::Validating);

        match validate(file.as_ref(), &self.policy) {
            Ok(request) => {
                self.file = file;
                self.transition(UploadState::FileSelected(request));
            }
            Err(reason) => {
                debug!("file rejected: {reason}");
                self.transition(UploadState::Invalid(reason));
            }
        }

        Ok(&self.state)
    }

    /// Re-selects the file of a failed attempt so it can be executed again
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NotReady` unless the last attempt failed
    pub fn retry(&mut self) -> Result<&UploadState, UploadError> {
        if !matches!(self.state, UploadState::Failed(..)) {
            return Err(UploadError::NotReady(self.state.name()));
        }
        let file = self.file.take();
        self.initiate(file)
    }

    /// Uploads the selected file and returns its read URL
    ///
    /// Failures are reflected in `UploadState::Failed` and returned. Nothing is retried.
    /// If the returned future is dropped before it completes, the attempt ends in
    /// `Failed` and the file stays selected for [`UploadOrchestrator::retry`].
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NotReady` unless a validated file is selected
    /// Returns `UploadError::CredentialIssuance` if the backend did not issue a credential
    /// Returns `UploadError::Transfer` if the store did not accept the write
    pub async fn execute(&mut self) -> Result<String, UploadError> {
        let (request, file) = match (&self.state, &self.file) {
            (UploadState::FileSelected(request), Some(file)) => (request.clone(), file.clone()),
            _ => return Err(UploadError::NotReady(self.state.name())),
        };

        let mut attempt = AttemptGuard(self);
        let result = attempt.0.run_attempt(request, file).await;
        drop(attempt);
        result
    }

    async fn run_attempt(
        &mut self,
        request: UploadRequest,
        file: SelectedFile,
    ) -> Result<String, UploadError> {
        self.transition(UploadState::RequestingCredential);

        let issued = self
            .issuer
            .issue(&request.file_name, &request.content_type)
            .await;
        let credential = match issued {
            Ok(credential) => credential,
            Err(e) => {
                warn!("credential issuance failed: {e}");
                self.transition(UploadState::Failed(
                    UploadErrorClass::CredentialIssuance,
                    e.to_string(),
                ));
                return Err(e.into());
            }
        };

        self.transition(UploadState::Transferring(0));

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let executor = Arc::clone(&self.executor);
        let mut transfer = executor.transfer(
            TransferRequest {
                url: credential.write_url,
                body: file.bytes,
                content_type: request.content_type,
            },
            progress_tx,
        );

        let outcome = loop {
            tokio::select! {
                biased;
                Some(progress) = progress_rx.recv() => self.apply_progress(progress),
                outcome = &mut transfer => break outcome,
            }
        };
        // Events queued before the terminal one, in send order
        while let Ok(progress) = progress_rx.try_recv() {
            self.apply_progress(progress);
        }

        match outcome {
            Ok(()) => {
                self.file = None;
                self.transition(UploadState::Succeeded(credential.read_url.clone()));
                Ok(credential.read_url)
            }
            Err(e) => {
                warn!("transfer failed: {e}");
                self.transition(UploadState::Failed(UploadErrorClass::Transfer, e.to_string()));
                Err(e.into())
            }
        }
    }

    fn apply_progress(&mut self, progress: TransferProgress) {
        if matches!(self.state, UploadState::Transferring(_)) {
            let percent = progress_percent(progress.bytes_sent, progress.total_bytes);
            self.transition(UploadState::Transferring(percent));
        }
    }
}

/// Ends an attempt whose future was dropped mid-flight
struct AttemptGuard<'a>(&'a mut UploadOrchestrator);

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        let class = match self.0.state {
            UploadState::RequestingCredential => UploadErrorClass::CredentialIssuance,
            UploadState::Transferring(_) => UploadErrorClass::Transfer,
            _ => return,
        };
        warn!("upload interrupted during {}", self.0.state.name());
        self.0.transition(UploadState::Failed(class, INTERRUPTED.to_string()));
    }
}
