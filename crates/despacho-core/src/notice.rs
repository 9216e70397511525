// ── User-facing notices ──
//
// Blocking alerts and success toasts are pushed onto an unbounded
// channel; whichever front end owns the receiver decides how to show
// them. A dropped receiver only loses the notice, never the operation.

use tokio::sync::mpsc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeKind {
    /// Blocking alert the operator must acknowledge.
    Alert,
    /// Transient confirmation.
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Sending half handed to every component that talks to the operator.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    pub fn channel() -> (Self, NoticeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn alert(&self, message: impl Into<String>) {
        self.push(NoticeKind::Alert, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    fn push(&self, kind: NoticeKind, message: String) {
        if self.tx.send(Notice { kind, message }).is_err() {
            trace!(%kind, "notice dropped: no receiver");
        }
    }
}
