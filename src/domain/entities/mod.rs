pub mod preview_draft;
pub mod service;
pub mod template;
pub mod template_folder;
pub mod user;

pub use preview_draft::*;
pub use service::*;
pub use template::*;
pub use template_folder::*;
pub use user::*;
