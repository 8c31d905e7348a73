use crate::domain::entities::Template;
use crate::domain::errors::ClientResult;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFileType {
    Pdf,
    Png,
}

impl PreviewFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewFileType::Pdf => "pdf",
            PreviewFileType::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            PreviewFileType::Pdf => "application/pdf",
            PreviewFileType::Png => "image/png",
        }
    }
}

impl std::str::FromStr for PreviewFileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(PreviewFileType::Pdf),
            "png" => Ok(PreviewFileType::Png),
            _ => Err(format!("Invalid preview file type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPreview {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Letter rendering lives in the template preview service.
#[async_trait]
pub trait TemplatePreviewApi: Send + Sync {
    async fn render(
        &self,
        template: &Template,
        filetype: PreviewFileType,
        page: Option<u32>,
        branding_filename: Option<&str>,
    ) -> ClientResult<RenderedPreview>;
    async fn page_count(&self, template: &Template) -> ClientResult<u32>;
    /// Renders an example letter with the given branding file, or none.
    async fn render_example(
        &self,
        subject: &str,
        content: &str,
        branding_filename: Option<&str>,
    ) -> ClientResult<RenderedPreview>;
}
