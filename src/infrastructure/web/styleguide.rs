use askama::Template as AskamaTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::domain::services::extract_placeholders;
use crate::infrastructure::http::middleware::{AppState, WebError, WebResult};

use super::forms::REQUIRED_MESSAGE;
use super::HtmlTemplate;

const EXAMPLE_SMS: &str =
    "Your vehicle tax for ((registration number)) is due on ((date)). Renew online at www.gov.uk/vehicle-tax";

#[derive(Debug, Clone)]
pub struct ExampleField {
    pub name: String,
    pub label: String,
    pub input_type: String,
    pub value: String,
    pub error: String,
}

impl ExampleField {
    fn new(name: &str, label: &str, input_type: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            input_type: input_type.to_string(),
            value: String::new(),
            error: String::new(),
        }
    }

    pub fn is_textarea(&self) -> bool {
        self.input_type == "textarea"
    }
}

#[derive(AskamaTemplate)]
#[template(path = "styleguide.html")]
struct StyleguidePage {
    flashes: Vec<crate::shared::FlashMessage>,
    fields: Vec<ExampleField>,
    sms: String,
    placeholders: Vec<String>,
}

/// Every form control in its empty, filled and failed state.
fn example_fields() -> Vec<ExampleField> {
    let mut password = ExampleField::new("password", "Password", "password");
    password.error = REQUIRED_MESSAGE.to_string();
    let mut message = ExampleField::new("message", "Message", "textarea");
    message.value = EXAMPLE_SMS.to_string();

    vec![
        ExampleField::new("username", "Username", "text"),
        password,
        ExampleField::new("code", "Enter code", "text"),
        message,
        ExampleField::new(
            "file_upload",
            "Upload a CSV file to add your recipients’ details",
            "file",
        ),
    ]
}

pub async fn styleguide(State(state): State<AppState>) -> WebResult<Response> {
    if !state.show_styleguide {
        return Err(WebError::not_found());
    }
    let page = StyleguidePage {
        flashes: Vec::new(),
        fields: example_fields(),
        sms: EXAMPLE_SMS.to_string(),
        placeholders: extract_placeholders(&[EXAMPLE_SMS]),
    };
    Ok(HtmlTemplate(page).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_the_required_field_fails() {
        let fields = example_fields();
        let failing: Vec<&str> = fields
            .iter()
            .filter(|f| !f.error.is_empty())
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(failing, vec!["password"]);
        assert!(fields[3].is_textarea());
    }
}
