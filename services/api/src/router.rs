use axum::{
    Router,
    routing::{delete, get, post},
};

use hub_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    admin::{enrich_resource, moderation_queue, review_resource, stats, toggle_top},
    auth::{create_authcode, create_token, revoke_token},
    batch::{get_batch, list_batches, resume_batch, start_batch},
    category::{
        create_category, delete_category, get_category, list_categories, update_category,
    },
    credit::{adjust_credits, get_balance, list_transactions, unlock_resource},
    favorite::{add_favorite, favorite_status, list_favorites, remove_favorite},
    health::{healthz, readyz},
    order::{create_order, get_order, list_orders, list_packages, payment_webhook},
    rating::{rate_resource, rating_summary, remove_rating},
    resource::{
        check_link, create_resource, delete_resource, get_resource, list_my_resources,
        list_resources, update_resource, visit_resource,
    },
    tag::{create_tag, delete_tag, list_tags},
    user::{get_me, list_users, update_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/api/auth/code", post(create_authcode))
        .route("/api/auth/token", post(create_token).delete(revoke_token))
        // Users
        .route("/api/users/me", get(get_me).patch(update_me))
        .route("/api/users/me/resources", get(list_my_resources))
        // Resources
        .route("/api/resources", get(list_resources).post(create_resource))
        .route("/api/resources/check-link", post(check_link))
        .route(
            "/api/resources/{id}",
            get(get_resource).put(update_resource).delete(delete_resource),
        )
        .route("/api/resources/{id}/visit", post(visit_resource))
        .route("/api/resources/{id}/unlock", post(unlock_resource))
        .route(
            "/api/resources/{id}/rating",
            get(rating_summary).put(rate_resource).delete(remove_rating),
        )
        // Batch upload
        .route("/api/resources/batch", get(list_batches).post(start_batch))
        .route("/api/resources/batch/{task_id}", get(get_batch))
        .route("/api/resources/batch/{task_id}/resume", post(resume_batch))
        // Categories
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        // Tags
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/{id}", delete(delete_tag))
        // Favorites
        .route("/api/favorites", get(list_favorites).post(add_favorite))
        .route(
            "/api/favorites/{resource_id}",
            get(favorite_status).delete(remove_favorite),
        )
        // Credits
        .route("/api/credits", get(get_balance))
        .route("/api/credits/transactions", get(list_transactions))
        // Orders
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/packages", get(list_packages))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/payments/webhook", post(payment_webhook))
        // Admin
        .route("/api/admin/resources", get(moderation_queue))
        .route("/api/admin/resources/{id}/review", post(review_resource))
        .route("/api/admin/resources/{id}/toggle-top", post(toggle_top))
        .route("/api/admin/resources/{id}/enrich", post(enrich_resource))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}/credits", post(adjust_credits))
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
