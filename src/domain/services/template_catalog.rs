use std::collections::HashSet;

use crate::domain::entities::{
    FolderPathItem, Template, TemplateFolder, TemplateTypeFilter, User, VisibleFolder,
};
use crate::domain::errors::{DomainError, DomainResult};

/// A template or a folder inside some folder.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogItem<'a> {
    Template(&'a Template),
    Folder(VisibleFolder),
}

/// Read-only view over one service's templates and folders.
///
/// Folder ids of `None` mean the top level.
#[derive(Debug, Clone, Copy)]
pub struct TemplateCatalog<'a> {
    templates: &'a [Template],
    folders: &'a [TemplateFolder],
}

impl<'a> TemplateCatalog<'a> {
    pub fn new(templates: &'a [Template], folders: &'a [TemplateFolder]) -> Self {
        Self { templates, folders }
    }

    pub fn templates(&self) -> &'a [Template] {
        self.templates
    }

    pub fn folders(&self) -> &'a [TemplateFolder] {
        self.folders
    }

    pub fn find_folder(&self, folder_id: &str) -> Option<&'a TemplateFolder> {
        self.folders.iter().find(|f| f.id == folder_id)
    }

    pub fn find_template(&self, template_id: &str) -> Option<&'a Template> {
        self.templates.iter().find(|t| t.id == template_id)
    }

    /// `Ok(None)` is the top level; an unknown id is `NotFound`.
    pub fn get_template_folder(&self, folder_id: Option<&str>) -> DomainResult<Option<&'a TemplateFolder>> {
        match folder_id {
            None => Ok(None),
            Some(id) => self
                .find_folder(id)
                .map(Some)
                .ok_or_else(|| DomainError::NotFound(format!("Template folder {} not found", id))),
        }
    }

    /// Templates of the type directly inside the folder. With a user, a
    /// folder they can't see holds nothing.
    pub fn get_templates(
        &self,
        filter: TemplateTypeFilter,
        folder_id: Option<&str>,
        user: Option<&User>,
    ) -> Vec<&'a Template> {
        if let (Some(user), Some(id)) = (user, folder_id) {
            if !user.has_template_folder_permission(self.find_folder(id)) {
                return Vec::new();
            }
        }
        self.templates
            .iter()
            .filter(|t| filter.matches(t.template_type) && t.folder.as_deref() == folder_id)
            .collect()
    }

    /// Folders the user may see, each attached to its nearest visible
    /// ancestor with the names of any hidden ancestors in front of its own.
    pub fn get_user_template_folders(&self, user: &User) -> Vec<VisibleFolder> {
        let mut visible = Vec::new();
        for folder in self.folders {
            if !user.has_template_folder_permission(Some(folder)) {
                continue;
            }
            let parent = folder.parent_id.as_deref().and_then(|id| self.find_folder(id));
            if parent.is_none() || user.has_template_folder_permission(parent) {
                visible.push(VisibleFolder::from(folder));
                continue;
            }

            let mut flattened = VisibleFolder::from(folder);
            flattened.parent_id = None;
            let mut ancestor = parent;
            let mut steps = 0;
            while let Some(hidden) = ancestor {
                flattened.names.insert(0, hidden.name.clone());
                steps += 1;
                match hidden.parent_id.as_deref().and_then(|id| self.find_folder(id)) {
                    Some(next) if user.has_template_folder_permission(Some(next)) => {
                        flattened.parent_id = Some(next.id.clone());
                        break;
                    }
                    Some(next) if steps < self.folders.len() => ancestor = Some(next),
                    _ => break,
                }
            }
            visible.push(flattened);
        }
        visible
    }

    /// Child folders of `parent_id` that hold something of the type.
    pub fn get_template_folders(
        &self,
        filter: TemplateTypeFilter,
        parent_id: Option<&str>,
        user: Option<&User>,
    ) -> Vec<VisibleFolder> {
        let folders = self.folders_for(user);
        folders
            .iter()
            .filter(|f| f.parent_id.as_deref() == parent_id)
            .filter(|f| self.subtree_has_type(&folders, &f.id, filter))
            .cloned()
            .collect()
    }

    /// Every folder is visible for `all`; otherwise the folder or one of its
    /// descendants must hold a template of the type.
    pub fn is_folder_visible(&self, folder_id: &str, filter: TemplateTypeFilter, user: Option<&User>) -> bool {
        if filter == TemplateTypeFilter::All {
            return true;
        }
        let folders = self.folders_for(user);
        self.subtree_has_type(&folders, folder_id, filter)
    }

    fn folders_for(&self, user: Option<&User>) -> Vec<VisibleFolder> {
        match user {
            Some(user) => self.get_user_template_folders(user),
            None => self.folders.iter().map(VisibleFolder::from).collect(),
        }
    }

    fn subtree_has_type(&self, folders: &[VisibleFolder], folder_id: &str, filter: TemplateTypeFilter) -> bool {
        if filter == TemplateTypeFilter::All {
            return true;
        }
        let mut seen = HashSet::new();
        let mut pending = vec![folder_id.to_string()];
        while let Some(id) = pending.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if !self.get_templates(filter, Some(&id), None).is_empty() {
                return true;
            }
            pending.extend(
                folders
                    .iter()
                    .filter(|f| f.parent_id.as_deref() == Some(id.as_str()))
                    .map(|f| f.id.clone()),
            );
        }
        false
    }

    /// Breadcrumb from the top level down to and including the folder.
    pub fn get_template_folder_path(&self, folder_id: Option<&str>) -> DomainResult<Vec<FolderPathItem>> {
        let mut path = Vec::new();
        let mut current = self.get_template_folder(folder_id)?;
        while let Some(folder) = current {
            if path.len() > self.folders.len() {
                return Err(DomainError::Internal(format!(
                    "Template folder {} has a cyclic parent chain",
                    folder.id
                )));
            }
            path.push(FolderPathItem::from(folder));
            current = self.get_template_folder(folder.parent_id.as_deref())?;
        }
        path.push(FolderPathItem::root());
        path.reverse();
        Ok(path)
    }

    /// Folder breadcrumb followed by the template itself.
    pub fn get_template_path(&self, template: &Template) -> DomainResult<Vec<FolderPathItem>> {
        let mut path = self.get_template_folder_path(template.folder.as_deref())?;
        path.push(FolderPathItem {
            id: Some(template.id.clone()),
            name: template.name.clone(),
        });
        Ok(path)
    }

    pub fn get_template_folders_and_templates(
        &self,
        filter: TemplateTypeFilter,
        folder_id: Option<&str>,
    ) -> Vec<CatalogItem<'a>> {
        self.get_templates(filter, folder_id, None)
            .into_iter()
            .map(CatalogItem::Template)
            .chain(
                self.get_template_folders(filter, folder_id, None)
                    .into_iter()
                    .map(CatalogItem::Folder),
            )
            .collect()
    }

    pub fn count_of_templates_and_folders(&self) -> usize {
        self.templates.len() + self.folders.len()
    }

    pub fn template_ids(&self) -> HashSet<&'a str> {
        self.templates.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn folder_ids(&self) -> HashSet<&'a str> {
        self.folders.iter().map(|f| f.id.as_str()).collect()
    }
}
