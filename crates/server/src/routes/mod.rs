pub mod account;
pub mod articles;
pub mod certificates;
pub mod clubs;
pub mod competitions;
pub mod events;
pub mod formations;
pub mod health;
pub mod inquiries;
pub mod media;
pub mod reservations;

use crate::auth::{require_admin, resolve_account};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};

/// Uploads of images, module documents and media
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/formations", get(formations::list_formations))
        .route("/formations/{slug}", get(formations::show_formation))
        .route("/events", get(events::list_events))
        .route("/events/{slug}", get(events::show_event))
        .route("/competitions", get(competitions::list_competitions))
        .route("/competitions/{slug}", get(competitions::show_competition))
        .route("/articles", get(articles::list_articles))
        .route("/articles/{slug}", get(articles::show_article))
        .route("/media", get(media::list_media))
        .route("/clubs", get(clubs::list_clubs))
        .route("/clubs/{slug}", get(clubs::show_club))
        .route("/clubs/{slug}/applications", post(clubs::apply_to_club))
        .route("/reservations", post(reservations::create_reservation))
        .route("/contact", post(inquiries::contact))
        .route("/partnerships", post(inquiries::partnership))
        .route(
            "/certificates/verify/{code}",
            get(certificates::verify_certificate),
        )
}

fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(account::me))
        .route("/me/profile", put(account::save_profile))
        .route("/me/formations", get(formations::my_formations))
        .route(
            "/me/formations/{id}/enrollment",
            post(formations::enroll).delete(formations::unenroll),
        )
        .route("/me/formations/{id}/modules", get(formations::my_modules))
        .route("/me/formations/{id}/progress", get(formations::my_progress))
        .route(
            "/me/formations/{id}/certificate",
            post(certificates::request_certificate),
        )
        .route("/me/modules/{id}/file", get(formations::my_module_file))
        .route(
            "/me/modules/{id}/completion",
            post(formations::complete_module).delete(formations::uncomplete_module),
        )
        .route("/me/events/{id}/registrations", post(events::register))
        .route("/me/event-registrations", get(events::my_registrations))
        .route(
            "/me/event-registrations/{id}",
            delete(events::cancel_registration),
        )
        .route(
            "/me/competitions/{id}/registrations",
            post(competitions::register),
        )
        .route(
            "/me/competition-registrations",
            get(competitions::my_registrations),
        )
        .route("/me/certificates", get(certificates::my_certificates))
        .route(
            "/me/certificates/{id}/file",
            get(certificates::my_certificate_file),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        // Formations and modules
        .route(
            "/admin/formations",
            get(formations::admin_list_formations).post(formations::create_formation),
        )
        .route(
            "/admin/formations/{id}",
            get(formations::admin_show_formation)
                .put(formations::update_formation)
                .delete(formations::delete_formation),
        )
        .route(
            "/admin/formations/{id}/toggle-status",
            post(formations::toggle_formation),
        )
        .route(
            "/admin/formations/{id}/enrollments",
            get(formations::formation_enrollments),
        )
        .route(
            "/admin/formations/{id}/modules",
            get(formations::admin_list_modules).post(formations::create_module),
        )
        .route(
            "/admin/modules/{id}",
            put(formations::update_module).delete(formations::delete_module),
        )
        .route("/admin/modules/{id}/file", get(formations::admin_module_file))
        // Events
        .route(
            "/admin/events",
            get(events::admin_list_events).post(events::create_event),
        )
        .route(
            "/admin/events/{id}",
            get(events::admin_show_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/admin/events/{id}/cancel", post(events::cancel_event))
        .route(
            "/admin/events/{id}/registrations",
            get(events::event_registrations),
        )
        .route(
            "/admin/event-registrations/{id}/status",
            put(events::review_registration),
        )
        // Competitions
        .route(
            "/admin/competitions",
            get(competitions::admin_list_competitions).post(competitions::create_competition),
        )
        .route(
            "/admin/competitions/{id}",
            get(competitions::admin_show_competition)
                .put(competitions::update_competition)
                .delete(competitions::delete_competition),
        )
        .route(
            "/admin/competitions/{id}/close",
            post(competitions::close_competition),
        )
        .route(
            "/admin/competitions/{id}/reopen",
            post(competitions::reopen_competition),
        )
        .route(
            "/admin/competitions/{id}/registrations",
            get(competitions::competition_registrations),
        )
        .route(
            "/admin/competition-registrations/{id}/status",
            put(competitions::review_registration),
        )
        // Reservations
        .route("/admin/reservations", get(reservations::list_reservations))
        .route(
            "/admin/reservations/{id}",
            get(reservations::show_reservation).delete(reservations::delete_reservation),
        )
        .route(
            "/admin/reservations/{id}/approve",
            post(reservations::approve_reservation),
        )
        .route(
            "/admin/reservations/{id}/reject",
            post(reservations::reject_reservation),
        )
        // Certificates
        .route(
            "/admin/certificates",
            get(certificates::list_certificates).post(certificates::create_certificate),
        )
        .route(
            "/admin/certificates/bulk-issue",
            post(certificates::bulk_issue_certificates),
        )
        .route(
            "/admin/certificates/{id}",
            delete(certificates::delete_certificate),
        )
        .route(
            "/admin/certificates/{id}/issue",
            post(certificates::issue_certificate),
        )
        .route(
            "/admin/certificates/{id}/file",
            get(certificates::certificate_file),
        )
        // Content
        .route(
            "/admin/articles",
            get(articles::admin_list_articles).post(articles::create_article),
        )
        .route(
            "/admin/articles/{id}",
            get(articles::admin_show_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route(
            "/admin/articles/{id}/toggle-status",
            post(articles::toggle_article),
        )
        .route(
            "/admin/articles/{id}/images/{image_id}",
            delete(articles::remove_article_image),
        )
        .route(
            "/admin/media",
            get(media::admin_list_media).post(media::create_media),
        )
        .route(
            "/admin/media/{id}",
            put(media::update_media).delete(media::delete_media),
        )
        .route(
            "/admin/clubs",
            get(clubs::admin_list_clubs).post(clubs::create_club),
        )
        .route(
            "/admin/clubs/{id}",
            get(clubs::admin_show_club)
                .put(clubs::update_club)
                .delete(clubs::delete_club),
        )
        .route("/admin/clubs/{id}/toggle-status", post(clubs::toggle_club))
        // Accounts
        .route("/admin/accounts", get(account::list_accounts))
        .route("/admin/accounts/{id}/role", put(account::set_role))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route_layer(middleware::from_fn(require_admin))
}

/// Builds the API.
///
/// `authenticate` wraps the `/me` and `/admin` routes and must put an
/// [`crate::auth::Subject`] in the request extensions; in production it is the
/// OAuth2 resource server followed by [`crate::auth::subject_from_claims`].
pub fn router(
    state: AppState,
    authenticate: impl FnOnce(Router<AppState>) -> Router<AppState>,
) -> Router {
    let protected = student_routes()
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_account,
        ));

    Router::new()
        .merge(public_routes())
        .merge(authenticate(protected))
        .with_state(state)
}
