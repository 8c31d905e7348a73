//! Paths of the console's pages, built the same way the router matches
//! them.

use crate::domain::entities::{TemplateType, TemplateTypeFilter};
use crate::domain::ports::PreviewFileType;

fn service(service_id: &str) -> String {
    format!("/services/{}", service_id)
}

fn typed_folder_suffix(filter: TemplateTypeFilter, folder_id: Option<&str>) -> String {
    match (filter, folder_id) {
        (TemplateTypeFilter::All, None) => String::new(),
        (TemplateTypeFilter::All, Some(folder)) => format!("/folders/{}", folder),
        (filter, None) => format!("/{}", filter.as_str()),
        (filter, Some(folder)) => format!("/{}/folders/{}", filter.as_str(), folder),
    }
}

pub fn choose_template(service_id: &str, filter: TemplateTypeFilter, folder_id: Option<&str>) -> String {
    format!("{}/templates{}", service(service_id), typed_folder_suffix(filter, folder_id))
}

pub fn create_template(service_id: &str, filter: TemplateTypeFilter, folder_id: Option<&str>) -> String {
    format!("{}/create", choose_template(service_id, filter, folder_id))
}

pub fn view_template(service_id: &str, template_id: &str) -> String {
    format!("{}/templates/{}", service(service_id), template_id)
}

pub fn view_template_version(service_id: &str, template_id: &str, version: i64) -> String {
    format!("{}/version/{}", view_template(service_id, template_id), version)
}

pub fn view_template_versions(service_id: &str, template_id: &str) -> String {
    format!("{}/versions", view_template(service_id, template_id))
}

pub fn letter_preview(service_id: &str, template_id: &str, filetype: PreviewFileType, page: Option<u32>) -> String {
    let base = format!("{}/templates/{}.{}", service(service_id), template_id, filetype.as_str());
    match page {
        Some(page) => format!("{}?page={}", base, page),
        None => base,
    }
}

pub fn letter_version_preview(service_id: &str, template_id: &str, version: i64, filetype: PreviewFileType) -> String {
    format!(
        "{}/version/{}.{}",
        view_template(service_id, template_id),
        version,
        filetype.as_str()
    )
}

pub fn preview_template(service_id: &str, template_id: Option<&str>) -> String {
    match template_id {
        Some(id) => format!("{}/preview", view_template(service_id, id)),
        None => format!("{}/templates/preview", service(service_id)),
    }
}

pub fn edit_template(service_id: &str, template_id: &str) -> String {
    format!("{}/edit", view_template(service_id, template_id))
}

pub fn add_template_by_type(service_id: &str, template_type: TemplateType, folder_id: Option<&str>) -> String {
    match folder_id {
        Some(folder) => format!(
            "{}/templates/folders/{}/add-{}",
            service(service_id),
            folder,
            template_type.as_str()
        ),
        None => format!("{}/templates/add-{}", service(service_id), template_type.as_str()),
    }
}

pub fn delete_template(service_id: &str, template_id: &str) -> String {
    format!("{}/delete", view_template(service_id, template_id))
}

pub fn redact_template(service_id: &str, template_id: &str) -> String {
    format!("{}/redact", view_template(service_id, template_id))
}

pub fn set_template_sender(service_id: &str, template_id: &str) -> String {
    format!("{}/set-template-sender", view_template(service_id, template_id))
}

pub fn edit_template_postage(service_id: &str, template_id: &str) -> String {
    format!("{}/edit-postage", view_template(service_id, template_id))
}

pub fn start_tour(service_id: &str, template_id: &str) -> String {
    format!("{}/start-tour/{}", service(service_id), template_id)
}

pub fn choose_template_to_copy(service_id: &str, from_service: Option<&str>, from_folder: Option<&str>) -> String {
    let mut url = format!("{}/templates/copy", service(service_id));
    if let Some(from_service) = from_service {
        url.push_str(&format!("/from-service/{}", from_service));
    }
    if let Some(from_folder) = from_folder {
        url.push_str(&format!("/from-folder/{}", from_folder));
    }
    url
}

pub fn copy_template(service_id: &str, template_id: &str, from_service: &str) -> String {
    format!(
        "{}/templates/copy/{}?from_service={}",
        service(service_id),
        template_id,
        from_service
    )
}

pub fn action_blocked(service_id: &str, notification_type: TemplateType, return_to: &str, template_id: &str) -> String {
    format!(
        "{}/templates/action-blocked/{}/{}/{}",
        service(service_id),
        notification_type.as_str(),
        return_to,
        template_id
    )
}

pub fn manage_template_folder(service_id: &str, folder_id: &str) -> String {
    format!("{}/templates/folders/{}/manage", service(service_id), folder_id)
}

pub fn delete_template_folder(service_id: &str, folder_id: &str) -> String {
    format!("{}/templates/folders/{}/delete", service(service_id), folder_id)
}

pub fn add_recipients(service_id: &str, template_id: &str) -> String {
    format!("{}/add-recipients/{}", service(service_id), template_id)
}

pub fn send_messages(service_id: &str, template_id: &str) -> String {
    format!("{}/send/{}/csv", service(service_id), template_id)
}

pub fn send_one_off(service_id: &str, template_id: &str) -> String {
    format!("{}/send/{}/one-off", service(service_id), template_id)
}

pub fn send_one_off_step(service_id: &str, template_id: &str, step_index: usize) -> String {
    format!("{}/step-{}", send_one_off(service_id, template_id), step_index)
}

pub fn service_settings(service_id: &str) -> String {
    format!("{}/service-settings", service(service_id))
}
