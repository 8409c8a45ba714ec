//! Contact and partnership messages; nothing is stored, the center is mailed.

use crate::error::ServiceResult;
use log::info;
use mailer::{Message, Notifier, Template};
use models::forms::{ContactForm, PartnershipForm};
use serde_json::json;
use validator::Validate;

pub struct InquiryService;

impl InquiryService {
    pub async fn contact(notifier: &Notifier, form: ContactForm) -> ServiceResult<()> {
        form.validate()?;
        let message = Message::new(
            Template::ContactMessage,
            notifier.admin_email(),
            &json!({
                "name": form.name,
                "email": form.email,
                "subject": form.subject,
                "message": form.message,
            }),
        );
        notifier.dispatch(message).await;

        info!("Forwarded contact message from {}", form.email);
        Ok(())
    }

    pub async fn partnership(notifier: &Notifier, form: PartnershipForm) -> ServiceResult<()> {
        form.validate()?;
        let message = Message::new(
            Template::PartnershipRequest,
            notifier.admin_email(),
            &json!({
                "organization": form.organization,
                "contact_name": form.contact_name,
                "email": form.email,
                "phone": form.phone,
                "message": form.message,
            }),
        );
        notifier.dispatch(message).await;

        info!("Forwarded partnership request from {}", form.organization);
        Ok(())
    }
}
