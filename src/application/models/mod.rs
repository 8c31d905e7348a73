pub mod service;
pub mod template_list;

pub use service::Service;
pub use template_list::{TemplateList, TemplateListItem, TemplateListItemKind, TemplateLists};
