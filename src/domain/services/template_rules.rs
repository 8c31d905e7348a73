use crate::domain::entities::{permissions, TemplateType, User};

use super::placeholders::normalise_placeholder;

pub const EMAIL_ADDRESS_HEADING: &str = "email address";
pub const PHONE_NUMBER_HEADING: &str = "phone number";

const LETTER_ADDRESS_HEADINGS: [&str; 7] = [
    "address line 1",
    "address line 2",
    "address line 3",
    "address line 4",
    "address line 5",
    "address line 6",
    "postcode",
];

/// Recipient columns every spreadsheet for the template type starts with.
pub fn first_column_headings(template_type: TemplateType) -> Vec<&'static str> {
    match template_type {
        TemplateType::Email => vec![EMAIL_ADDRESS_HEADING],
        TemplateType::Sms => vec![PHONE_NUMBER_HEADING],
        TemplateType::Letter => LETTER_ADDRESS_HEADINGS.to_vec(),
    }
}

fn example_value(heading: &str) -> &'static str {
    match normalise_placeholder(heading).as_str() {
        "emailaddress" => "test@example.com",
        "phonenumber" => "6502532222",
        "addressline1" => "A. Name",
        "addressline2" => "123 Example St.",
        "postcode" => "XM4 5HQ",
        _ => "",
    }
}

/// Headings of an example spreadsheet: recipient columns then placeholders
/// that aren't already among them.
pub fn example_column_headings(template_type: TemplateType, placeholders: &[String]) -> Vec<String> {
    let mut headings: Vec<String> = first_column_headings(template_type)
        .into_iter()
        .map(str::to_string)
        .collect();
    for placeholder in placeholders {
        let key = normalise_placeholder(placeholder);
        if !headings.iter().any(|h| normalise_placeholder(h) == key) {
            headings.push(placeholder.clone());
        }
    }
    headings
}

/// One example row matching `example_column_headings`.
pub fn example_csv_row(template_type: TemplateType, placeholders: &[String]) -> Vec<String> {
    let recipient_columns = first_column_headings(template_type).len();
    example_column_headings(template_type, placeholders)
        .iter()
        .enumerate()
        .map(|(index, heading)| {
            if index < recipient_columns {
                example_value(heading).to_string()
            } else {
                "example".to_string()
            }
        })
        .collect()
}

/// Spreadsheet column letters: A, B, ... Z, AA, AB ...
pub fn column_letters(count: usize) -> Vec<String> {
    (0..count)
        .map(|mut index| {
            let mut letters = Vec::new();
            loop {
                letters.push((b'A' + (index % 26) as u8) as char);
                if index < 26 {
                    break;
                }
                index = index / 26 - 1;
            }
            letters.iter().rev().collect()
        })
        .collect()
}

/// The service has switched off the channel this email or SMS template
/// sends on. Letters are never blocked here.
pub fn email_or_sms_not_enabled(template_type: TemplateType, service_permissions: &[String]) -> bool {
    matches!(template_type, TemplateType::Email | TemplateType::Sms)
        && !service_permissions.iter().any(|p| p == template_type.as_str())
}

/// Users who can only send go straight to sending instead of the template
/// page. Letters always show the template page.
pub fn should_skip_template_page(user: &User, service_id: &str, template_type: TemplateType) -> bool {
    user.has_permissions(service_id, &[permissions::SEND_MESSAGES], false)
        && !user.has_permissions(
            service_id,
            &[permissions::MANAGE_TEMPLATES, permissions::MANAGE_API_KEYS],
            false,
        )
        && template_type != TemplateType::Letter
}
