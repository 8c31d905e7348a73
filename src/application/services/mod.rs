pub mod preview_draft_store;

pub use preview_draft_store::{preview_draft_key, PreviewDraftStore, PREVIEW_DRAFT_TTL};
