pub mod cookies;
pub mod flash;

pub use flash::{Flash, FlashMessage};
