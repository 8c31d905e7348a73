mod helpers;
use helpers::*;

use axum::http::{header, StatusCode};
use notify_admin::domain::entities::TemplateType;
use notify_admin::shared::cookies::ONE_OFF_COOKIE;
use serde_json::json;

fn app_with_templates() -> TestApp {
    let app = TestApp::new();
    app.notify.with(|d| {
        d.templates
            .insert(SERVICE_ONE_ID.to_string(), vec![sms_template(), email_template()]);
    });
    app
}

fn templates_url(rest: &str) -> String {
    format!("/services/{}/templates{}", SERVICE_ONE_ID, rest)
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::signed_out();
    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn test_signed_out_user_is_sent_to_sign_in() {
    let app = TestApp::signed_out();
    let response = app.get(&templates_url("")).await;

    assert_redirect(&response, "/sign-in");
}

#[tokio::test]
async fn test_styleguide_is_hidden_unless_enabled() {
    let mut app = TestApp::new();
    assert_eq!(app.get("/_styleguide").await.status(), StatusCode::NOT_FOUND);

    app.state.show_styleguide = true;
    let response = app.get("/_styleguide").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("registration number"));
}

#[tokio::test]
async fn test_choose_template_lists_templates() {
    let app = app_with_templates();
    let response = app.get(&templates_url("")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Two week reminder"));
    assert!(body.contains("Welcome email"));
}

#[tokio::test]
async fn test_user_from_another_service_cannot_see_templates() {
    let app = TestApp::signed_in_as(user_with_permissions(USER_TWO_ID, &[(SERVICE_TWO_ID, &["view_activity"])]));
    let response = app.get(&templates_url("")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_view_template_shows_name_and_content() {
    let app = app_with_templates();
    let response = app.get(&templates_url(&format!("/{}", TEMPLATE_ONE_ID))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Two week reminder"));
    assert!(body.contains("your appointment is soon"));
}

#[tokio::test]
async fn test_view_template_skips_to_sending_for_senders_only() {
    let app = TestApp::signed_in_as(user_with_permissions(
        USER_TWO_ID,
        &[(SERVICE_ONE_ID, &["view_activity", "send_messages"])],
    ));
    app.notify.with(|d| {
        d.templates.insert(SERVICE_ONE_ID.to_string(), vec![sms_template()]);
    });

    let response = app.get(&templates_url(&format!("/{}", TEMPLATE_ONE_ID))).await;

    assert_redirect(
        &response,
        &format!("/services/{}/send/{}/one-off", SERVICE_ONE_ID, TEMPLATE_ONE_ID),
    );
}

#[tokio::test]
async fn test_view_only_user_cannot_edit() {
    let app = TestApp::signed_in_as(active_user_view_permissions());
    app.notify.with(|d| {
        d.templates.insert(SERVICE_ONE_ID.to_string(), vec![sms_template()]);
    });

    let response = app.get(&templates_url(&format!("/{}/edit", TEMPLATE_ONE_ID))).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_add_sms_template_saves_and_flashes() {
    let app = app_with_templates();
    let response = app
        .post_form(
            &templates_url("/add-sms"),
            "name=Appointment+reminder&template_content=See+you+at+((time))",
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with(&templates_url("/")));
    let messages = flash_messages(&response);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "'Appointment reminder' template saved");

    let created = app.notify.read(|d| d.created_templates.clone());
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0.template_type, TemplateType::Sms);
    assert_eq!(created[0].0.content, "See you at ((time))");
    assert_eq!(created[0].1, None);
}

#[tokio::test]
async fn test_add_sms_template_rejects_emoji() {
    let app = app_with_templates();
    let response = app
        .post_form(
            &templates_url("/add-sms"),
            "name=Party&template_content=Come+along+%F0%9F%8E%89",
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("in text messages"));
    assert!(app.notify.read(|d| d.created_templates.is_empty()));
}

#[tokio::test]
async fn test_add_template_shows_api_length_error_on_the_form() {
    let app = app_with_templates();
    app.notify.with(|d| {
        d.template_save_error = Some((
            400,
            json!({"content": ["Content has a character count greater than the limit of 612"]}),
        ))
    });

    let response = app
        .post_form(&templates_url("/add-sms"), "name=Long&template_content=Very+long")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Content has a character count greater than the limit of 612"));
}

#[tokio::test]
async fn test_priority_templates_need_platform_admin() {
    let app = app_with_templates();
    let response = app
        .post_form(
            &templates_url("/add-sms"),
            "name=Urgent&template_content=Now&process_type=priority",
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_preview_then_save_new_template() {
    let app = app_with_templates();
    let response = app
        .post_form(
            &templates_url("/add-sms"),
            "name=Draft+reminder&template_content=Hi+((name))&button_pressed=preview",
        )
        .await;
    assert_redirect(&response, &templates_url("/preview"));

    let preview = app.get(&templates_url("/preview")).await;
    assert_eq!(preview.status(), StatusCode::OK);
    assert!(body_text(preview).await.contains("Draft reminder"));

    let saved = app.post_form(&templates_url("/preview"), "button_pressed=save").await;
    assert_eq!(saved.status(), StatusCode::SEE_OTHER);
    assert_eq!(flash_messages(&saved)[0].text, "'Draft reminder' template saved");
    let created = app.notify.read(|d| d.created_templates.clone());
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0.name, "Draft reminder");
}

#[tokio::test]
async fn test_preview_without_a_draft_goes_back_to_choosing() {
    let app = app_with_templates();
    let response = app.post_form(&templates_url("/preview"), "button_pressed=save").await;

    assert_redirect(&response, &templates_url(""));
    assert!(app.notify.read(|d| d.created_templates.is_empty()));
}

#[tokio::test]
async fn test_changing_placeholders_asks_for_confirmation() {
    let app = app_with_templates();
    let response = app
        .post_form(
            &templates_url(&format!("/{}/edit", TEMPLATE_ONE_ID)),
            "name=Two+week+reminder&template_content=Hello+((name))+at+((time))",
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Confirm changes"));
    assert!(body.contains("((time))"));
    assert!(app.notify.read(|d| d.updated_templates.is_empty()));
}

#[tokio::test]
async fn test_confirmed_edit_updates_template() {
    let app = app_with_templates();
    let response = app
        .post_form(
            &templates_url(&format!("/{}/edit", TEMPLATE_ONE_ID)),
            "name=Two+week+reminder&template_content=Hello+((name))+at+((time))&confirm=true",
        )
        .await;

    assert_redirect(&response, &templates_url(&format!("/{}", TEMPLATE_ONE_ID)));
    let updated = app.notify.read(|d| d.updated_templates.clone());
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, TEMPLATE_ONE_ID);
}

#[tokio::test]
async fn test_delete_asks_for_confirmation() {
    let app = app_with_templates();
    let response = app
        .get(&templates_url(&format!("/{}/delete", TEMPLATE_ONE_ID)))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Are you sure you want to delete"));
    assert!(body.contains("Two week reminder"));
    assert!(body.contains("Yes, delete"));
}

#[tokio::test]
async fn test_delete_template_returns_to_its_folder() {
    let app = app_with_templates();
    let response = app
        .post_form(&templates_url(&format!("/{}/delete", TEMPLATE_ONE_ID)), "")
        .await;

    assert_redirect(&response, &templates_url(""));
    assert_eq!(
        app.notify.read(|d| d.deleted_templates.clone()),
        vec![TEMPLATE_ONE_ID.to_string()]
    );
}

#[tokio::test]
async fn test_non_empty_folder_cannot_be_deleted() {
    let app = app_with_templates();
    app.notify.with(|d| {
        d.folders.insert(
            SERVICE_ONE_ID.to_string(),
            vec![folder(FOLDER_ONE_ID, "Reminders", None, &[USER_ONE_ID])],
        );
        d.templates.get_mut(SERVICE_ONE_ID).unwrap()[0].folder = Some(FOLDER_ONE_ID.to_string());
    });

    let response = app
        .post_form(&templates_url(&format!("/folders/{}/delete", FOLDER_ONE_ID)), "")
        .await;

    assert_redirect(&response, &templates_url(&format!("/folders/{}", FOLDER_ONE_ID)));
    assert_eq!(
        flash_messages(&response)[0].text,
        "You must empty this folder before you can delete it"
    );
    assert!(app.notify.read(|d| d.deleted_folders.is_empty()));
}

#[tokio::test]
async fn test_folder_emptied_elsewhere_is_reported_by_the_api() {
    let app = app_with_templates();
    app.notify.with(|d| {
        d.folders.insert(
            SERVICE_ONE_ID.to_string(),
            vec![folder(FOLDER_ONE_ID, "Reminders", None, &[USER_ONE_ID])],
        );
        d.folder_delete_error = Some((400, json!("Folder is not empty")));
    });

    let response = app
        .post_form(&templates_url(&format!("/folders/{}/delete", FOLDER_ONE_ID)), "")
        .await;

    assert_redirect(&response, &templates_url(&format!("/folders/{}", FOLDER_ONE_ID)));
    assert!(sets_flash_cookie(&response));
}

#[tokio::test]
async fn test_empty_folder_is_deleted() {
    let app = app_with_templates();
    app.notify.with(|d| {
        d.folders.insert(
            SERVICE_ONE_ID.to_string(),
            vec![folder(FOLDER_ONE_ID, "Reminders", None, &[USER_ONE_ID])],
        );
    });

    let response = app
        .post_form(&templates_url(&format!("/folders/{}/delete", FOLDER_ONE_ID)), "")
        .await;

    assert_redirect(&response, &templates_url(""));
    assert_eq!(
        app.notify.read(|d| d.deleted_folders.clone()),
        vec![FOLDER_ONE_ID.to_string()]
    );
}

#[tokio::test]
async fn test_copy_prefills_a_copy_name() {
    let app = app_with_templates();
    let response = app
        .get(&format!(
            "{}?from_service={}",
            templates_url(&format!("/copy/{}", TEMPLATE_TWO_ID)),
            SERVICE_ONE_ID
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Copy email template"));
    assert!(body.contains("Welcome email (copy)"));
}

#[tokio::test]
async fn test_copy_without_a_source_service_is_forbidden() {
    let app = app_with_templates();
    let response = app
        .get(&templates_url(&format!("/copy/{}", TEMPLATE_TWO_ID)))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_template_data_wraps_prefill_result() {
    let app = TestApp::new();
    app.notify.with(|d| d.prefill = json!({"subject": "Hello"}));

    let response = app
        .post_form(&format!("/services/templates/{}/get-data", TEMPLATE_ONE_ID), "")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({"result": {"subject": "Hello"}}));
}

#[tokio::test]
async fn test_one_recipient_starts_one_off_send() {
    let app = app_with_templates();
    let response = app
        .post_form(
            &format!("/services/{}/add-recipients/{}", SERVICE_ONE_ID, TEMPLATE_TWO_ID),
            "what_type=one_recipient&placeholder_value=test%40example.com",
        )
        .await;

    assert_redirect(
        &response,
        &format!("/services/{}/send/{}/one-off/step-1", SERVICE_ONE_ID, TEMPLATE_TWO_ID),
    );
    assert!(response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(ONE_OFF_COOKIE)));
}

#[tokio::test]
async fn test_add_recipients_needs_a_choice() {
    let app = app_with_templates();
    let response = app
        .post_form(
            &format!("/services/{}/add-recipients/{}", SERVICE_ONE_ID, TEMPLATE_TWO_ID),
            "",
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Select how you want to add recipients"));
}
