use crate::routes::{
    account, articles, certificates, clubs, competitions, events, formations, health, inquiries,
    media, reservations,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        account::me,
        account::save_profile,
        account::list_accounts,
        account::set_role,
        articles::list_articles,
        articles::show_article,
        articles::admin_list_articles,
        articles::admin_show_article,
        articles::create_article,
        articles::update_article,
        articles::toggle_article,
        articles::remove_article_image,
        articles::delete_article,
        certificates::verify_certificate,
        certificates::request_certificate,
        certificates::my_certificates,
        certificates::my_certificate_file,
        certificates::list_certificates,
        certificates::create_certificate,
        certificates::issue_certificate,
        certificates::bulk_issue_certificates,
        certificates::certificate_file,
        certificates::delete_certificate,
        clubs::list_clubs,
        clubs::show_club,
        clubs::apply_to_club,
        clubs::admin_list_clubs,
        clubs::admin_show_club,
        clubs::create_club,
        clubs::update_club,
        clubs::toggle_club,
        clubs::delete_club,
        competitions::list_competitions,
        competitions::show_competition,
        competitions::register,
        competitions::my_registrations,
        competitions::admin_list_competitions,
        competitions::admin_show_competition,
        competitions::create_competition,
        competitions::update_competition,
        competitions::delete_competition,
        competitions::close_competition,
        competitions::reopen_competition,
        competitions::competition_registrations,
        competitions::review_registration,
        events::list_events,
        events::show_event,
        events::register,
        events::my_registrations,
        events::cancel_registration,
        events::admin_show_event,
        events::create_event,
        events::update_event,
        events::delete_event,
        events::cancel_event,
        events::event_registrations,
        events::review_registration,
        events::admin_list_events,
        formations::list_formations,
        formations::show_formation,
        formations::my_formations,
        formations::enroll,
        formations::unenroll,
        formations::my_modules,
        formations::my_progress,
        formations::my_module_file,
        formations::complete_module,
        formations::uncomplete_module,
        formations::admin_list_formations,
        formations::admin_show_formation,
        formations::create_formation,
        formations::update_formation,
        formations::toggle_formation,
        formations::delete_formation,
        formations::formation_enrollments,
        formations::admin_list_modules,
        formations::create_module,
        formations::update_module,
        formations::delete_module,
        formations::admin_module_file,
        health::health,
        inquiries::contact,
        inquiries::partnership,
        media::list_media,
        media::admin_list_media,
        media::create_media,
        media::update_media,
        media::delete_media,
        reservations::create_reservation,
        reservations::list_reservations,
        reservations::show_reservation,
        reservations::approve_reservation,
        reservations::reject_reservation,
        reservations::delete_reservation,
    ),
    components(schemas(crate::error::ErrorBody)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Account", description = "Profile of the signed-in user"),
        (name = "Formations", description = "Published training catalogue"),
        (name = "Enrollment", description = "Enrollment, module access and progress"),
        (name = "Certificates", description = "Certificate requests, downloads and public verification"),
        (name = "Events", description = "Events and attendee registrations"),
        (name = "Competitions", description = "Competitions and team applications"),
        (name = "Reservations", description = "Room, computer and equipment bookings"),
        (name = "Articles", description = "News and blog"),
        (name = "Media", description = "Media library"),
        (name = "Clubs", description = "Student clubs and applications"),
        (name = "Contact", description = "Contact and partnership requests"),
        (name = "Admin", description = "Back-office, admin role required"),
    ),
    info(
        title = "Digital Center API",
        version = "1.0.0",
        description = "University digital center portal",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
