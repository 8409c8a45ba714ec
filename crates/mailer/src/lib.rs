//! Transactional email.
//!
//! Delivery is fire-and-forget: [`Notifier::dispatch`] never fails the
//! caller, it only logs what could not be sent.

mod message;
mod template;
mod transport;

pub use message::Message;
pub use template::Template;
pub use transport::{DeliveryError, LogMailer, Mailer, MemoryMailer};

use log::{debug, warn};
use std::sync::Arc;

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    admin_email: String,
}

impl Notifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            mailer,
            from: from.into(),
            admin_email: admin_email.into(),
        }
    }

    /// Address receiving contact, partnership and club messages
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    pub async fn dispatch(&self, message: Message) {
        match self.mailer.send(&self.from, &message).await {
            Ok(()) => debug!("Sent {:?} to {}", message.template, message.to),
            Err(e) => warn!("{e}"),
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("from", &self.from)
            .field("admin_email", &self.admin_email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message() -> Message {
        Message::new(
            Template::ContactMessage,
            "admin@center.test",
            &json!({ "name": "Awa", "email": "awa@univ.test", "subject": "Horaires", "message": "Bonjour" }),
        )
    }

    #[tokio::test]
    async fn test_dispatch_records_message() {
        let mailer = Arc::new(MemoryMailer::new());
        let notifier = Notifier::new(mailer.clone(), "no-reply@center.test", "admin@center.test");

        notifier.dispatch(message()).await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Nouveau message de contact : Horaires");
    }

    #[tokio::test]
    async fn test_dispatch_swallows_delivery_errors() {
        let mailer = Arc::new(MemoryMailer::failing());
        let notifier = Notifier::new(mailer.clone(), "no-reply@center.test", "admin@center.test");

        notifier.dispatch(message()).await;

        assert!(mailer.sent().is_empty());
    }
}
