//! Application state and core logic

use crate::relay::EmailRelay;
use crate::state::forms::{Focus, FormEvent, FormSchema, FormStore, ValidationResult};
use crate::state::{
    RelayTarget, SubmissionOrchestrator, SubmissionOutcome, SubmissionReport, FAILURE_NOTICE,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

pub const SUCCESS_MESSAGE: &str = "Thank you! Your application has been sent.";

/// Main application struct
pub struct App {
    /// Canonical form state
    pub store: FormStore,
    /// Submission state and relay access
    pub submission: SubmissionOrchestrator,
    /// Status line message
    pub status_message: Option<String>,
    /// Failure notice shown as a modal until dismissed
    pub error_notice: Option<String>,
    /// Set by the first submit; from then on edits re-validate their field
    submitted_once: bool,
    /// Whether the app should quit
    quit: bool,
    events: broadcast::Receiver<FormEvent>,
    reports_tx: mpsc::UnboundedSender<SubmissionReport>,
    reports_rx: mpsc::UnboundedReceiver<SubmissionReport>,
}

impl App {
    /// Create a new App instance
    pub fn new(schema: FormSchema, relay: Arc<dyn EmailRelay>, target: RelayTarget) -> Self {
        let store = FormStore::new(schema);
        let events = store.subscribe();
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();

        Self {
            store,
            submission: SubmissionOrchestrator::new(relay, target),
            status_message: None,
            error_notice: None,
            submitted_once: false,
            quit: false,
            events,
            reports_tx,
            reports_rx,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Failure notice is modal
        if self.error_notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.error_notice = None;
            }
            return Ok(());
        }

        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.submit();
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Tab => self.store.next_focus(),
            KeyCode::BackTab => self.store.prev_focus(),
            _ => match self.store.focus() {
                Focus::Submit => {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.submit();
                    }
                }
                Focus::Field(_) => self.handle_field_key(key)?,
            },
        }
        Ok(())
    }

    fn handle_field_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(field) = self.store.focused_field() else {
            return Ok(());
        };
        let is_choice = field.kind.is_choice();
        let is_multiline = field.kind.is_multiline();

        if is_choice {
            match key.code {
                KeyCode::Up => self.store.prev_option(),
                KeyCode::Down => self.store.next_option(),
                KeyCode::Char(' ') => self.store.activate_option()?,
                KeyCode::Enter => self.store.next_focus(),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.store.push_char(c)?
            }
            KeyCode::Backspace => self.store.pop_char()?,
            KeyCode::Enter if is_multiline => self.store.newline()?,
            KeyCode::Enter => self.store.next_focus(),
            _ => {}
        }
        Ok(())
    }

    /// Validate and, if everything passes, dispatch the form
    pub fn submit(&mut self) {
        if self.submission.in_progress() {
            debug!("Submit ignored, a submission is already in progress");
            return;
        }
        self.submitted_once = true;

        let form = match self.store.validate() {
            ValidationResult::Valid(form) => form,
            ValidationResult::Invalid(errors) => {
                debug!("Form has {} invalid field(s)", errors.len());
                self.status_message = Some(format!(
                    "Please fix the {} highlighted field(s)",
                    errors.len()
                ));
                return;
            }
        };
        debug!(values = ?form.values(), "Submitting form");

        match self.submission.begin(&form) {
            Ok(pending) => {
                let reports = self.reports_tx.clone();
                tokio::spawn(async move {
                    let report = pending.dispatch().await;
                    // Receiver only goes away when the app shuts down
                    let _ = reports.send(report);
                });
                self.status_message = Some("Sending...".to_string());
            }
            Err(e) => debug!("Submit ignored: {e}"),
        }
    }

    /// Apply reports from finished dispatches
    pub fn poll_submissions(&mut self) {
        while let Ok(report) = self.reports_rx.try_recv() {
            self.apply_report(report);
        }
    }

    fn apply_report(&mut self, report: SubmissionReport) {
        match self.submission.complete(report).clone() {
            SubmissionOutcome::Success => {
                self.status_message = Some(SUCCESS_MESSAGE.to_string());
            }
            SubmissionOutcome::Failure(_) => {
                self.status_message = None;
                self.error_notice = Some(FAILURE_NOTICE.to_string());
            }
            SubmissionOutcome::None => {}
        }
    }

    /// React to store changes since the last call
    pub fn sync_form_events(&mut self) -> Result<()> {
        loop {
            match self.events.try_recv() {
                Ok(FormEvent::ValueChanged { field }) => {
                    if self.submitted_once {
                        self.store.revalidate_field(&field)?;
                    }
                    if !self.submission.in_progress() {
                        self.status_message = None;
                    }
                }
                Ok(FormEvent::ErrorsChanged) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {skipped} form events, re-validating everything");
                    if self.submitted_once {
                        self.store.validate();
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        Ok(())
    }
}
