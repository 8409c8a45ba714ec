pub mod article;
pub mod article_image;
pub mod certificate;
pub mod club;
pub mod competition;
pub mod competition_registration;
pub mod competition_team_member;
pub mod event;
pub mod event_registration;
pub mod formation;
pub mod formation_registration;
pub mod media;
pub mod module;
pub mod module_completion;
pub mod reservation;
pub mod user;
