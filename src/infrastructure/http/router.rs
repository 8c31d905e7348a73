use crate::infrastructure::http::middleware::{web_auth_middleware, AppState};
use crate::infrastructure::web::{
    copy, folders, letters, recipients, styleguide, template_editor, template_settings, templates,
};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    // Template pages, all scoped to one service
    let service_routes = Router::new()
        .route(
            "/templates",
            get(templates::choose_template).post(templates::submit_choose_template),
        )
        .route(
            "/templates/create",
            get(templates::create_template).post(templates::submit_create_template),
        )
        .route(
            "/templates/preview",
            get(template_editor::preview_new_template)
                .post(template_editor::submit_preview_new_template),
        )
        .route("/templates/copy", get(copy::choose_template_to_copy))
        .route(
            "/templates/copy/from-folder/:from_folder",
            get(copy::choose_template_to_copy_from_folder),
        )
        .route(
            "/templates/copy/from-service/:from_service",
            get(copy::choose_template_to_copy_from_service),
        )
        .route(
            "/templates/copy/from-service/:from_service/from-folder/:from_folder",
            get(copy::choose_template_to_copy_from_service_folder),
        )
        .route(
            "/templates/copy/:template_id",
            get(copy::copy_template).post(copy::submit_copy_template),
        )
        .route(
            "/templates/action-blocked/:notification_type/:return_to/:template_id",
            get(template_settings::action_blocked),
        )
        // Folders
        .route(
            "/templates/folders/:template_folder_id",
            get(templates::choose_template_in_folder).post(templates::submit_choose_template_in_folder),
        )
        .route(
            "/templates/folders/:template_folder_id/create",
            get(templates::create_template_in_folder).post(templates::submit_create_template_in_folder),
        )
        .route(
            "/templates/folders/:template_folder_id/manage",
            get(folders::manage_template_folder).post(folders::submit_manage_template_folder),
        )
        .route(
            "/templates/folders/:template_folder_id/delete",
            get(folders::confirm_delete_template_folder).post(folders::delete_template_folder),
        )
        .route(
            "/templates/folders/:template_folder_id/:add_type",
            get(template_editor::add_template_in_folder).post(template_editor::submit_add_template_in_folder),
        )
        // A template id, a letter file, a type filter or an add-{type} action
        .route(
            "/templates/:template_id",
            get(templates::show_template_segment).post(templates::submit_template_segment),
        )
        .route(
            "/templates/:template_id/create",
            get(templates::create_typed_template).post(templates::submit_create_typed_template),
        )
        .route("/templates/:template_id/copy", get(copy::choose_typed_template_to_copy))
        .route(
            "/templates/:template_id/folders/:template_folder_id",
            get(templates::choose_typed_template_in_folder)
                .post(templates::submit_choose_typed_template_in_folder),
        )
        .route(
            "/templates/:template_id/folders/:template_folder_id/create",
            get(templates::create_typed_template_in_folder)
                .post(templates::submit_create_typed_template_in_folder),
        )
        .route(
            "/templates/:template_id/folders/:template_folder_id/copy",
            get(copy::choose_template_to_copy_from_listing_folder),
        )
        .route(
            "/templates/:template_id/preview",
            get(template_editor::preview_template).post(template_editor::submit_preview_template),
        )
        .route(
            "/templates/:template_id/edit",
            get(template_editor::edit_template).post(template_editor::submit_edit_template),
        )
        .route(
            "/templates/:template_id/delete",
            get(template_settings::confirm_delete_template).post(template_settings::delete_template),
        )
        .route(
            "/templates/:template_id/redact",
            get(template_settings::confirm_redact_template).post(template_settings::redact_template),
        )
        .route(
            "/templates/:template_id/versions",
            get(template_settings::view_template_versions),
        )
        .route(
            "/templates/:template_id/version/:version",
            get(template_settings::view_template_version),
        )
        .route(
            "/templates/:template_id/set-template-sender",
            get(template_settings::set_template_sender).post(template_settings::submit_template_sender),
        )
        .route(
            "/templates/:template_id/edit-postage",
            get(template_settings::edit_template_postage).post(template_settings::submit_template_postage),
        )
        .route("/start-tour/:template_id", get(templates::start_tour))
        .route(
            "/add-recipients/:template_id",
            get(recipients::add_recipients).post(recipients::submit_add_recipients),
        );

    // Build web routes (require a signed-in user)
    let web_protected = Router::new()
        .nest("/services/:service_id", service_routes)
        .route(
            "/services/templates/:template_id/get-data",
            post(templates::get_template_data),
        )
        .route(
            "/templates/letter-preview-image/:filename",
            get(letters::letter_branding_preview_image),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            web_auth_middleware,
        ));

    // Build public routes
    Router::new()
        .route("/health", get(health_handler))
        .route("/_styleguide", get(styleguide::styleguide))
        .merge(web_protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}
