//! Notification outbox decoupling delivery from workflow transactions.
//!
//! Workflow operations never talk to the transport directly. They append a
//! [`NotificationIntent`] to the outbox in the same breath as their state
//! change; the [`OutboxWorker`] drains the queue and hands intents to the
//! transport, retrying a bounded number of times. Delivery is best-effort and
//! at-most-once per attempt — a failed send never fails the workflow call
//! that produced it.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fixed catalog of notification types the engine can emit. The transport
/// owns formatting and delivery; the engine supplies structured context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationReceived,
    ApplicationStatus,
    InterviewScheduled,
    PanelInvitation,
    OfferLetter,
    OnboardingWelcome,
    OnboardingReminder,
    ClearanceReminder,
    ClearanceEscalation,
    AccessRevoked,
    FinalSettlement,
}

impl NotificationKind {
    /// Template key understood by the transport.
    pub const fn template_key(self) -> &'static str {
        match self {
            NotificationKind::ApplicationReceived => "application_received",
            NotificationKind::ApplicationStatus => "application_status",
            NotificationKind::InterviewScheduled => "interview_scheduled",
            NotificationKind::PanelInvitation => "panel_invitation",
            NotificationKind::OfferLetter => "offer_letter",
            NotificationKind::OnboardingWelcome => "onboarding_welcome",
            NotificationKind::OnboardingReminder => "onboarding_reminder",
            NotificationKind::ClearanceReminder => "clearance_reminder",
            NotificationKind::ClearanceEscalation => "clearance_escalation",
            NotificationKind::AccessRevoked => "access_revoked",
            NotificationKind::FinalSettlement => "final_settlement",
        }
    }
}

/// One queued notification: who, what, and the template context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub kind: NotificationKind,
    pub recipient: String,
    pub context: BTreeMap<String, String>,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u8,
}

impl NotificationIntent {
    pub fn new(kind: NotificationKind, recipient: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            recipient: recipient.into(),
            context: BTreeMap::new(),
            enqueued_at: now,
            attempts: 0,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }
}

/// Appending side of the outbox, used by workflow services.
pub trait NotificationOutbox: Send + Sync {
    fn enqueue(&self, intent: NotificationIntent) -> Result<(), OutboxError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("outbox unavailable: {0}")]
    Unavailable(String),
}

/// Appends an intent, logging and swallowing any outbox failure. This is the
/// only place workflow code is allowed to drop an error on the floor.
pub fn enqueue_best_effort(outbox: &dyn NotificationOutbox, intent: NotificationIntent) {
    if let Err(err) = outbox.enqueue(intent.clone()) {
        warn!(
            template = intent.kind.template_key(),
            recipient = %intent.recipient,
            %err,
            "dropping notification intent"
        );
    }
}

/// Delivery side owned by the external transport.
pub trait NotificationTransport: Send + Sync {
    fn send(&self, intent: &NotificationIntent) -> Result<(), TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("notification transport unavailable: {0}")]
    Unavailable(String),
    #[error("recipient '{0}' rejected")]
    Rejected(String),
}

/// In-memory outbox queue shared by the services and the worker.
#[derive(Default, Clone)]
pub struct MemoryOutbox {
    queue: Arc<Mutex<VecDeque<NotificationIntent>>>,
}

impl MemoryOutbox {
    /// Removes up to `limit` intents for delivery.
    pub fn take_batch(&self, limit: usize) -> Vec<NotificationIntent> {
        let mut guard = self.queue.lock().expect("outbox mutex poisoned");
        let take = limit.min(guard.len());
        guard.drain(..take).collect()
    }

    /// Returns a failed intent to the back of the queue.
    pub fn requeue(&self, intent: NotificationIntent) {
        self.queue
            .lock()
            .expect("outbox mutex poisoned")
            .push_back(intent);
    }

    pub fn len(&self) -> usize {
        self.queue.lock().expect("outbox mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the queued intents, oldest first.
    pub fn pending(&self) -> Vec<NotificationIntent> {
        self.queue
            .lock()
            .expect("outbox mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

impl NotificationOutbox for MemoryOutbox {
    fn enqueue(&self, intent: NotificationIntent) -> Result<(), OutboxError> {
        self.queue
            .lock()
            .expect("outbox mutex poisoned")
            .push_back(intent);
        Ok(())
    }
}

const MAX_DELIVERY_ATTEMPTS: u8 = 3;

/// Outcome of one worker pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub retried: usize,
    pub dropped: usize,
}

/// Drains the outbox and delivers through the transport.
pub struct OutboxWorker<T> {
    outbox: MemoryOutbox,
    transport: Arc<T>,
    batch_size: usize,
}

impl<T> OutboxWorker<T>
where
    T: NotificationTransport,
{
    pub fn new(outbox: MemoryOutbox, transport: Arc<T>) -> Self {
        Self {
            outbox,
            transport,
            batch_size: 64,
        }
    }

    /// Attempts delivery of one batch. Failures are isolated per intent:
    /// a rejected recipient never blocks the rest of the batch.
    pub fn deliver_pending(&self) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for mut intent in self.outbox.take_batch(self.batch_size) {
            match self.transport.send(&intent) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    intent.attempts += 1;
                    if intent.attempts >= MAX_DELIVERY_ATTEMPTS {
                        warn!(
                            template = intent.kind.template_key(),
                            recipient = %intent.recipient,
                            %err,
                            "giving up on notification after {MAX_DELIVERY_ATTEMPTS} attempts"
                        );
                        report.dropped += 1;
                    } else {
                        warn!(
                            template = intent.kind.template_key(),
                            recipient = %intent.recipient,
                            %err,
                            "notification delivery failed, requeueing"
                        );
                        self.outbox.requeue(intent);
                        report.retried += 1;
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyTransport {
        failures_remaining: AtomicUsize,
    }

    impl NotificationTransport for FlakyTransport {
        fn send(&self, intent: &NotificationIntent) -> Result<(), TransportError> {
            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
                return Err(TransportError::Rejected(intent.recipient.clone()));
            }
            Ok(())
        }
    }

    fn intent(recipient: &str) -> NotificationIntent {
        NotificationIntent::new(NotificationKind::OnboardingReminder, recipient, Utc::now())
            .with("employee", "emp-001")
    }

    #[test]
    fn failed_delivery_is_requeued_then_delivered() {
        let outbox = MemoryOutbox::default();
        outbox.enqueue(intent("a@example.com")).expect("enqueue");
        let transport = Arc::new(FlakyTransport {
            failures_remaining: AtomicUsize::new(1),
        });
        let worker = OutboxWorker::new(outbox.clone(), transport);

        let first = worker.deliver_pending();
        assert_eq!(first.retried, 1);
        assert_eq!(outbox.len(), 1);

        let second = worker.deliver_pending();
        assert_eq!(second.delivered, 1);
        assert!(outbox.is_empty());
    }

    #[test]
    fn intents_are_dropped_after_bounded_attempts() {
        let outbox = MemoryOutbox::default();
        outbox.enqueue(intent("b@example.com")).expect("enqueue");
        let transport = Arc::new(FlakyTransport {
            failures_remaining: AtomicUsize::new(usize::MAX),
        });
        let worker = OutboxWorker::new(outbox.clone(), transport);

        let mut dropped = 0;
        for _ in 0..MAX_DELIVERY_ATTEMPTS {
            dropped += worker.deliver_pending().dropped;
        }
        assert_eq!(dropped, 1);
        assert!(outbox.is_empty());
    }

    #[test]
    fn one_bad_recipient_does_not_block_the_batch() {
        let outbox = MemoryOutbox::default();
        outbox.enqueue(intent("bad@example.com")).expect("enqueue");
        outbox.enqueue(intent("good@example.com")).expect("enqueue");
        let transport = Arc::new(FlakyTransport {
            failures_remaining: AtomicUsize::new(1),
        });
        let worker = OutboxWorker::new(outbox.clone(), transport);

        let report = worker.deliver_pending();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.retried, 1);
    }
}
