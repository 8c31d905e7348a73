mod helpers;
use helpers::*;

use notify_admin::application::models::service::{Service, ENGLISH_SIGNATURE, FRENCH_SIGNATURE};
use notify_admin::application::services::{preview_draft_key, PreviewDraftStore};
use notify_admin::domain::entities::{PreviewDraft, TemplateType};
use notify_admin::infrastructure::persistence::MemoryStore;
use std::sync::Arc;

fn notify_with_templates() -> FakeNotify {
    let notify = FakeNotify::new();
    notify.with(|d| {
        d.services = vec![service_one()];
        d.templates.insert(
            SERVICE_ONE_ID.to_string(),
            vec![
                sms_template(),
                email_template(),
                template(LETTER_TEMPLATE_ID, "Reminder letter", TemplateType::Letter, "Dear ((name))"),
            ],
        );
        d.folders.insert(
            SERVICE_ONE_ID.to_string(),
            vec![
                folder(FOLDER_TWO_ID, "zebra", None, &[]),
                folder(FOLDER_ONE_ID, "Apples", None, &[]),
            ],
        );
    });
    notify
}

#[tokio::test]
async fn test_service_templates_are_fetched_once_per_instance() {
    let notify = notify_with_templates();
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    service.all_templates().await.unwrap();
    service.all_template_ids().await.unwrap();
    assert!(service.has_templates().await.unwrap());

    assert_eq!(notify.read(|d| d.get_templates_calls), 1);
    assert_eq!(notify.read(|d| d.get_service_calls), 1);
}

#[tokio::test]
async fn test_service_only_lists_templates_of_types_it_can_send() {
    let notify = notify_with_templates();
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    let names: Vec<&str> = service
        .all_templates()
        .await
        .unwrap()
        .iter()
        .map(|t| t.name.as_str())
        .collect();

    assert_eq!(names, vec!["Two week reminder", "Welcome email"]);
    assert!(service.has_multiple_template_types().await.unwrap());
}

#[tokio::test]
async fn test_service_folders_sort_ignoring_case() {
    let notify = notify_with_templates();
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    let names: Vec<&str> = service
        .all_template_folders()
        .await
        .unwrap()
        .iter()
        .map(|f| f.name.as_str())
        .collect();

    assert_eq!(names, vec!["Apples", "zebra"]);
}

#[tokio::test]
async fn test_move_to_folder_drops_unknown_ids() {
    let notify = notify_with_templates();
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    let contents = service
        .move_to_folder(
            &[
                TEMPLATE_ONE_ID.to_string(),
                FOLDER_TWO_ID.to_string(),
                "not-a-real-id".to_string(),
                TEMPLATE_ONE_ID.to_string(),
            ],
            Some(FOLDER_ONE_ID),
        )
        .await
        .unwrap();

    assert_eq!(contents.templates, vec![TEMPLATE_ONE_ID.to_string()]);
    assert_eq!(contents.folders, vec![FOLDER_TWO_ID.to_string()]);
    let moves = notify.read(|d| d.moves.clone());
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].0.as_deref(), Some(FOLDER_ONE_ID));
}

#[tokio::test]
async fn test_template_outside_users_folders_is_forbidden() {
    let notify = notify_with_templates();
    notify.with(|d| {
        let templates = d.templates.get_mut(SERVICE_ONE_ID).unwrap();
        templates[0].folder = Some(FOLDER_ONE_ID.to_string());
        let folders = d.folders.get_mut(SERVICE_ONE_ID).unwrap();
        folders[1] = folder(FOLDER_ONE_ID, "Apples", None, &[USER_TWO_ID]);
    });
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    let result = service
        .get_template_with_user_permission_or_403(TEMPLATE_ONE_ID, &active_user_with_permissions())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_preview_draft_round_trip_and_delete() {
    let drafts = PreviewDraftStore::new(Arc::new(MemoryStore::new()));
    let draft = PreviewDraft {
        name: "New reminder".to_string(),
        content: "Hello".to_string(),
        template_type: Some(TemplateType::Sms),
        ..Default::default()
    };

    drafts.set(SERVICE_ONE_ID, None, &draft).await.unwrap();
    assert_eq!(drafts.get(SERVICE_ONE_ID, None).await, draft);
    assert_eq!(drafts.get(SERVICE_ONE_ID, Some(TEMPLATE_ONE_ID)).await, PreviewDraft::default());

    drafts.delete(SERVICE_ONE_ID, None).await.unwrap();
    assert_eq!(drafts.get(SERVICE_ONE_ID, None).await, PreviewDraft::default());
}

#[test]
fn test_preview_draft_keys_are_scoped_to_template() {
    assert_ne!(
        preview_draft_key(SERVICE_ONE_ID, None),
        preview_draft_key(SERVICE_ONE_ID, Some(TEMPLATE_ONE_ID))
    );
    assert!(preview_draft_key(SERVICE_ONE_ID, Some(TEMPLATE_ONE_ID)).contains(TEMPLATE_ONE_ID));
}

#[tokio::test]
async fn test_force_permission_adds_and_removes() {
    let notify = notify_with_templates();
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    let updated = service.force_permission("letter", true, USER_ONE_ID).await.unwrap();
    assert!(updated.permissions.contains(&"letter".to_string()));
    assert!(updated.permissions.contains(&"sms".to_string()));

    let updated = service.force_permission("sms", false, USER_ONE_ID).await.unwrap();
    assert!(!updated.permissions.contains(&"sms".to_string()));
}

#[tokio::test]
async fn test_toggle_research_mode_flips_flag() {
    let notify = notify_with_templates();
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    let updated = service.toggle_research_mode(USER_ONE_ID).await.unwrap();

    assert!(updated.research_mode);
    assert!(!service.data().research_mode);
}

#[tokio::test]
async fn test_sms_senders_carry_hints() {
    let notify = notify_with_templates();
    notify.with(|d| {
        let mut inbound = sms_sender("GOVUK", true);
        inbound.inbound_number_id = Some("inbound-1".to_string());
        d.sms_senders = vec![inbound, sms_sender("Other", false)];
    });
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    let hints: Vec<Option<String>> = service
        .sms_senders_with_hints()
        .await
        .unwrap()
        .into_iter()
        .map(|(_, hint)| hint)
        .collect();

    assert_eq!(hints, vec![Some("(default and receives replies)".to_string()), None]);
    assert_eq!(service.default_sms_sender().await.unwrap().as_deref(), Some("GOVUK"));
}

#[tokio::test]
async fn test_remove_default_letter_contact_block() {
    let notify = notify_with_templates();
    notify.with(|d| d.letter_contacts = vec![letter_contact("1 Street\nTown", true)]);
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    service.remove_default_letter_contact_block().await.unwrap();

    let contacts = notify.read(|d| d.letter_contacts.clone());
    assert!(!contacts[0].is_default);
    assert_eq!(contacts[0].contact_block, "1 Street\nTown");
}

#[tokio::test]
async fn test_email_branding_name_falls_back_to_signature() {
    let notify = notify_with_templates();
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();
    assert_eq!(service.email_branding_name().await.unwrap(), ENGLISH_SIGNATURE);

    notify.with(|d| d.services[0].default_branding_is_french = true);
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();
    assert_eq!(service.email_branding_name().await.unwrap(), FRENCH_SIGNATURE);

    notify.with(|d| d.services[0].email_branding = Some("branding-1".to_string()));
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();
    assert_eq!(service.email_branding_name().await.unwrap(), "Example branding");
}

#[tokio::test]
async fn test_service_without_inbound_number_or_folders() {
    let notify = FakeNotify::new();
    notify.with(|d| d.services = vec![service_one()]);
    let service = Service::from_id(&notify.apis(), SERVICE_ONE_ID, 7).await.unwrap();

    assert!(!service.has_inbound_number().await.unwrap());
    assert!(!service.has_folders().await.unwrap());
    assert!(!service.has_templates().await.unwrap());
}
