use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::create_cors_layer;
use crate::config::security::{apply_security_headers, security_header_layers};
use crate::handlers::{self, auth, events, orders, payments, reports, sessions, users};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/users/:id", get(users::get_profile).put(users::update_profile))
        .route("/my/tickets", get(users::my_tickets))
        .route("/events", get(events::list_public_events))
        .route("/events/:id", get(events::event_detail))
        .route("/my/events", get(events::my_events))
        .route(
            "/admin/events",
            get(events::admin_list_events).post(events::admin_create_event),
        )
        .route(
            "/admin/events/:id",
            put(events::admin_update_event).delete(events::admin_delete_event),
        )
        .route(
            "/admin/sessions",
            get(sessions::admin_list_sessions).post(sessions::admin_create_session),
        )
        .route("/admin/sessions/open", get(sessions::admin_open_sessions))
        .route(
            "/admin/sessions/:id",
            put(sessions::admin_update_session).delete(sessions::admin_delete_session),
        )
        .route("/orders", post(orders::create_order))
        .route("/tickets/check-in", post(orders::check_in_ticket))
        .route("/payment/qr/:order_id", get(payments::payment_qr))
        .route("/payment/confirm/:order_id", post(payments::confirm_payment))
        .route("/admin/reports/open-sessions", get(reports::open_sessions_report))
        .route("/admin/reports/event-revenue", get(reports::event_revenue_report))
        .route("/admin/stats/revenue", get(reports::revenue_stats))
        .route(
            "/admin/functions/organizer-revenue",
            get(reports::organizer_revenue),
        )
        .route(
            "/admin/functions/customer-ticket-count",
            get(reports::customer_ticket_count),
        );

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state);

    apply_security_headers(router, security_header_layers())
}
