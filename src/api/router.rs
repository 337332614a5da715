//! REST API router.
//!
//! Returns a composable `Router`. `/auth` is open; the `/admin`,
//! `/doctor`, and `/patient` groups sit behind the bearer-token
//! middleware.
//!
//! Middleware uses `Extension<ApiContext>` (injected as the outermost
//! layer). Endpoint handlers use `State<ApiContext>` via `with_state`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    // Open routes: registration and login issue the tokens everything
    // else requires.
    let open = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx.clone());

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/admin/dashboard", get(endpoints::admin::dashboard))
        .route("/admin/doctors", get(endpoints::admin::list_doctors))
        .route("/admin/add-doctor", post(endpoints::admin::add_doctor))
        .route(
            "/admin/delete-doctor/:id",
            delete(endpoints::admin::delete_doctor),
        )
        .route("/admin/sessions", post(endpoints::admin::create_session))
        // GET takes a doctor id, DELETE a session id; matchit requires
        // one param name per position, so both verbs share `:id`.
        .route(
            "/admin/sessions/:id",
            get(endpoints::admin::list_sessions).delete(endpoints::admin::delete_session),
        )
        .route(
            "/admin/appointments",
            get(endpoints::admin::list_appointments),
        )
        .route(
            "/admin/appointments/reconcile",
            post(endpoints::admin::reconcile_appointments),
        )
        .route("/admin/inventory", get(endpoints::admin::list_inventory))
        .route(
            "/admin/inventory/add",
            post(endpoints::admin::add_inventory_item),
        )
        .route(
            "/admin/inventory/:id",
            put(endpoints::admin::update_inventory_item)
                .delete(endpoints::admin::delete_inventory_item),
        )
        .route("/admin/analytics", get(endpoints::admin::analytics_report))
        .route(
            "/doctor/appointments/:doctor_id",
            get(endpoints::doctor::appointments),
        )
        .route(
            "/doctor/patients/:doctor_id",
            get(endpoints::doctor::patients),
        )
        .route(
            "/doctor/upload-transcript",
            post(endpoints::doctor::upload_transcript),
        )
        .route(
            "/doctor/transcripts/:patient_id/:doctor_id",
            get(endpoints::doctor::transcripts),
        )
        .route("/patient/user/:user_id", get(endpoints::patient::user))
        .route("/patient/dashboard", get(endpoints::patient::dashboard))
        .route("/patient/doctors", get(endpoints::patient::doctors))
        .route(
            "/patient/sessions/:doctor_id",
            get(endpoints::patient::sessions),
        )
        .route(
            "/patient/book-session",
            post(endpoints::patient::book_session),
        )
        .route(
            "/patient/my-bookings/:patient_id",
            get(endpoints::patient::my_bookings),
        )
        .route(
            "/patient/cancel-booking/:session_id",
            post(endpoints::patient::cancel_booking),
        )
        .route(
            "/patient/transcripts/:user_id",
            get(endpoints::patient::transcripts),
        )
        .route(
            "/patient/transcript/:transcript_id/:user_id",
            get(endpoints::patient::transcript),
        )
        .with_state(ctx.clone())
        .route_layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so the middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    Router::new().merge(open).merge(protected)
}
