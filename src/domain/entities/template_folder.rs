use serde::{Deserialize, Serialize};

pub const ROOT_FOLDER_NAME: &str = "Templates";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateFolder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub users_with_permission: Vec<String>,
}

/// A folder as one user sees it.
///
/// When some ancestors are hidden from the user, the folder is attached to
/// its nearest visible ancestor and the hidden ancestors' names are kept in
/// front of its own name.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleFolder {
    pub id: String,
    pub names: Vec<String>,
    pub parent_id: Option<String>,
    pub users_with_permission: Vec<String>,
}

impl VisibleFolder {
    pub fn display_name(&self) -> String {
        self.names.join(" / ")
    }
}

impl From<&TemplateFolder> for VisibleFolder {
    fn from(folder: &TemplateFolder) -> Self {
        Self {
            id: folder.id.clone(),
            names: vec![folder.name.clone()],
            parent_id: folder.parent_id.clone(),
            users_with_permission: folder.users_with_permission.clone(),
        }
    }
}

/// One step of a breadcrumb from the root folder down.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderPathItem {
    pub id: Option<String>,
    pub name: String,
}

impl FolderPathItem {
    pub fn root() -> Self {
        Self {
            id: None,
            name: ROOT_FOLDER_NAME.to_string(),
        }
    }
}

impl From<&TemplateFolder> for FolderPathItem {
    fn from(folder: &TemplateFolder) -> Self {
        Self {
            id: Some(folder.id.clone()),
            name: folder.name.clone(),
        }
    }
}

/// Result of moving templates and folders: the ids the API was asked to move.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FolderContents {
    pub templates: Vec<String>,
    pub folders: Vec<String>,
}
