use crate::message::Message;
use async_trait::async_trait;
use log::info;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to deliver '{subject}' to {to}: {reason}")]
pub struct DeliveryError {
    pub to: String,
    pub subject: String,
    pub reason: String,
}

/// Delivery transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, from: &str, message: &Message) -> Result<(), DeliveryError>;
}

/// Writes outgoing mail to the log instead of a mail server
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, from: &str, message: &Message) -> Result<(), DeliveryError> {
        info!(
            "mail {:?} from {from} to {}: {}\n{}",
            message.template, message.to, message.subject, message.body
        );
        Ok(())
    }
}

/// Keeps sent messages in memory; can be told to fail every delivery
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Message>>,
    failing: AtomicBool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.failing.store(true, Ordering::Relaxed);
        mailer
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, _from: &str, message: &Message) -> Result<(), DeliveryError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(DeliveryError {
                to: message.to.clone(),
                subject: message.subject.clone(),
                reason: "transport unavailable".to_owned(),
            });
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
