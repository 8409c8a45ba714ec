pub mod certificate;
pub mod content;
pub mod document;
pub mod forms;
pub mod registration;
pub mod slug;
pub mod status;
pub mod transition;
