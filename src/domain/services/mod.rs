pub mod placeholders;
pub mod sms_characters;
pub mod template_catalog;
pub mod template_naming;
pub mod template_rules;

pub use placeholders::*;
pub use sms_characters::*;
pub use template_catalog::*;
pub use template_naming::*;
pub use template_rules::*;
