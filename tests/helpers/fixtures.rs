use notify_admin::domain::entities::{
    permissions, EmailReplyToAddress, LetterContact, ProcessType, ServiceData, SmsSender, Template, TemplateFolder,
    TemplateType, User,
};
use std::collections::HashMap;

pub const SERVICE_ONE_ID: &str = "596364a0-858e-42c8-9062-a8fe822260eb";
pub const SERVICE_TWO_ID: &str = "147ad62a-2951-4fa1-9ca0-093cd1a52c52";
pub const USER_ONE_ID: &str = "7b395b52-c6c1-469c-bf61-bfc6ac9a8b1d";
pub const USER_TWO_ID: &str = "a4b5a2d1-8c8e-4b8d-9a1a-4b1c2d3e4f50";
pub const TEMPLATE_ONE_ID: &str = "b22d7d94-2197-4a7d-a8e7-fd5f9770bf48";
pub const TEMPLATE_TWO_ID: &str = "6e2d4b79-5a6f-4d5c-8c0e-3f0c1b2a9d87";
pub const LETTER_TEMPLATE_ID: &str = "0c2fd3a6-1b5f-4f49-9b3a-8e0f5d9c7a61";
pub const FOLDER_ONE_ID: &str = "3a1f9c6e-2b4d-4e8f-9a0b-1c2d3e4f5a6b";
pub const FOLDER_TWO_ID: &str = "9d8c7b6a-5f4e-4d3c-8b2a-1f0e9d8c7b6a";

pub fn service_json(id: &str, name: &str, permissions: &[&str]) -> ServiceData {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "permissions": permissions,
    }))
    .unwrap()
}

pub fn service_one() -> ServiceData {
    service_json(SERVICE_ONE_ID, "service one", &["email", "sms"])
}

pub fn service_two() -> ServiceData {
    service_json(SERVICE_TWO_ID, "service two", &["email", "sms", "letter"])
}

pub fn user_with_permissions(id: &str, service_permissions: &[(&str, &[&str])]) -> User {
    let mut perms = HashMap::new();
    for (service_id, granted) in service_permissions {
        perms.insert(
            service_id.to_string(),
            granted.iter().map(|p| p.to_string()).collect(),
        );
    }
    User {
        id: id.to_string(),
        name: "Test User".to_string(),
        email_address: "test@example.com".to_string(),
        platform_admin: false,
        state: "active".to_string(),
        services: service_permissions.iter().map(|(sid, _)| sid.to_string()).collect(),
        permissions: perms,
    }
}

/// Signed in with every permission on service one.
pub fn active_user_with_permissions() -> User {
    user_with_permissions(
        USER_ONE_ID,
        &[(
            SERVICE_ONE_ID,
            &[
                permissions::MANAGE_TEMPLATES,
                permissions::MANAGE_SERVICE,
                permissions::MANAGE_API_KEYS,
                permissions::SEND_MESSAGES,
                permissions::VIEW_ACTIVITY,
            ],
        )],
    )
}

/// A member of service one who can only look at activity.
pub fn active_user_view_permissions() -> User {
    user_with_permissions(USER_ONE_ID, &[(SERVICE_ONE_ID, &[permissions::VIEW_ACTIVITY])])
}

pub fn platform_admin_user() -> User {
    let mut user = user_with_permissions(USER_ONE_ID, &[]);
    user.platform_admin = true;
    user
}

pub fn template(id: &str, name: &str, template_type: TemplateType, content: &str) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        template_type,
        content: content.to_string(),
        subject: template_type.has_subject().then(|| "Your ((thing)) is due soon".to_string()),
        process_type: Some(ProcessType::Normal),
        service: Some(SERVICE_ONE_ID.to_string()),
        folder: None,
        postage: None,
        reply_to: None,
        reply_to_text: None,
        service_letter_contact: None,
        version: Some(1),
        created_at: Some("2024-01-01T12:00:00.000000Z".to_string()),
        updated_at: None,
        archived: false,
        redact_personalisation: false,
    }
}

pub fn sms_template() -> Template {
    template(TEMPLATE_ONE_ID, "Two week reminder", TemplateType::Sms, "Hello ((name)), your appointment is soon")
}

pub fn email_template() -> Template {
    template(TEMPLATE_TWO_ID, "Welcome email", TemplateType::Email, "Dear ((name)), welcome")
}

pub fn folder(id: &str, name: &str, parent_id: Option<&str>, users: &[&str]) -> TemplateFolder {
    TemplateFolder {
        id: id.to_string(),
        name: name.to_string(),
        parent_id: parent_id.map(str::to_string),
        users_with_permission: users.iter().map(|u| u.to_string()).collect(),
    }
}

pub fn reply_to(address: &str, is_default: bool) -> EmailReplyToAddress {
    EmailReplyToAddress {
        id: format!("reply-to-{}", address),
        email_address: address.to_string(),
        is_default,
    }
}

pub fn sms_sender(sender: &str, is_default: bool) -> SmsSender {
    SmsSender {
        id: format!("sms-sender-{}", sender),
        sms_sender: sender.to_string(),
        is_default,
        inbound_number_id: None,
    }
}

pub fn letter_contact(block: &str, is_default: bool) -> LetterContact {
    LetterContact {
        id: "letter-contact-1".to_string(),
        contact_block: block.to_string(),
        is_default,
    }
}
