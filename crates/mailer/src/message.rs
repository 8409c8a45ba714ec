use crate::template::Template;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub template: Template,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Message {
    /// Builds the message from a snapshot of the entity at send time
    pub fn new(template: Template, to: impl Into<String>, data: &Value) -> Self {
        let (subject, body) = template.render(data);
        Self {
            template,
            to: to.into(),
            subject,
            body,
        }
    }
}
