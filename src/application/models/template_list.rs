use crate::domain::entities::{TemplateType, TemplateTypeFilter, User};
use crate::domain::errors::DomainResult;
use crate::domain::services::TemplateCatalog;

use super::service::Service;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateListItemKind {
    Service,
    Folder,
    Template,
}

/// One row of a flattened template tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateListItem {
    pub kind: TemplateListItemKind,
    pub id: String,
    pub name: String,
    pub service_id: String,
    /// Ids of the folders (and service) above this row, outermost first.
    pub ancestors: Vec<String>,
    pub hint: String,
    pub template_type: Option<TemplateType>,
}

impl TemplateListItem {
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    pub fn is_folder(&self) -> bool {
        self.kind == TemplateListItemKind::Folder
    }

    pub fn is_template(&self) -> bool {
        self.kind == TemplateListItemKind::Template
    }

    pub fn is_service(&self) -> bool {
        self.kind == TemplateListItemKind::Service
    }
}

fn count_hint(count: usize, singular: &str) -> Option<String> {
    match count {
        0 => None,
        1 => Some(format!("1 {}", singular)),
        n => Some(format!("{} {}s", n, singular)),
    }
}

/// "Empty", "1 template", "2 templates, 1 folder".
pub fn folder_hint(templates: usize, folders: usize) -> String {
    let parts: Vec<String> = [count_hint(templates, "template"), count_hint(folders, "folder")]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        "Empty".to_string()
    } else {
        parts.join(", ")
    }
}

/// Folders first, each followed by its contents, then the templates at
/// this level.
#[derive(Debug, Clone, Default)]
pub struct TemplateList {
    items: Vec<TemplateListItem>,
}

impl TemplateList {
    pub fn new(
        catalog: &TemplateCatalog<'_>,
        service_id: &str,
        filter: TemplateTypeFilter,
        folder_id: Option<&str>,
        user: Option<&User>,
    ) -> Self {
        let mut items = Vec::new();
        collect(catalog, service_id, filter, folder_id, user, &[], &mut items);
        Self { items }
    }

    pub fn items(&self) -> &[TemplateListItem] {
        &self.items
    }

    pub fn templates_to_show(&self) -> bool {
        self.items.iter().any(TemplateListItem::is_template)
    }
}

fn collect(
    catalog: &TemplateCatalog<'_>,
    service_id: &str,
    filter: TemplateTypeFilter,
    folder_id: Option<&str>,
    user: Option<&User>,
    ancestors: &[String],
    items: &mut Vec<TemplateListItem>,
) {
    if ancestors.len() > catalog.folders().len() {
        return;
    }
    for folder in catalog.get_template_folders(filter, folder_id, user) {
        let templates = catalog.get_templates(filter, Some(&folder.id), None).len();
        let folders = catalog.get_template_folders(filter, Some(&folder.id), user).len();
        items.push(TemplateListItem {
            kind: TemplateListItemKind::Folder,
            id: folder.id.clone(),
            name: folder.display_name(),
            service_id: service_id.to_string(),
            ancestors: ancestors.to_vec(),
            hint: folder_hint(templates, folders),
            template_type: None,
        });

        let mut nested = ancestors.to_vec();
        nested.push(folder.id.clone());
        collect(catalog, service_id, filter, Some(&folder.id), user, &nested, items);
    }

    for template in catalog.get_templates(filter, folder_id, user) {
        items.push(TemplateListItem {
            kind: TemplateListItemKind::Template,
            id: template.id.clone(),
            name: template.name.clone(),
            service_id: service_id.to_string(),
            ancestors: ancestors.to_vec(),
            hint: template.template_type.label().to_string(),
            template_type: Some(template.template_type),
        });
    }
}

/// Templates of every service the user belongs to, grouped by service.
///
/// With a single service there is no service row and no extra depth.
#[derive(Debug, Clone, Default)]
pub struct TemplateLists {
    items: Vec<TemplateListItem>,
}

impl TemplateLists {
    pub fn new(services: &[(&Service, TemplateCatalog<'_>)], user: &User) -> Self {
        let mut sorted: Vec<&(&Service, TemplateCatalog<'_>)> = services.iter().collect();
        sorted.sort_by_key(|(service, _)| service.name().to_lowercase());

        let mut items = Vec::new();
        let grouped = sorted.len() > 1;
        for (service, catalog) in sorted {
            let ancestors = if grouped {
                items.push(TemplateListItem {
                    kind: TemplateListItemKind::Service,
                    id: service.id().to_string(),
                    name: service.name().to_string(),
                    service_id: service.id().to_string(),
                    ancestors: Vec::new(),
                    hint: String::new(),
                    template_type: None,
                });
                vec![service.id().to_string()]
            } else {
                Vec::new()
            };
            collect(
                catalog,
                service.id(),
                TemplateTypeFilter::All,
                None,
                Some(user),
                &ancestors,
                &mut items,
            );
        }
        Self { items }
    }

    /// Loads every service of the user and builds the grouped list.
    pub async fn for_user(
        apis: &crate::domain::ports::NotifyApis,
        user: &User,
        activity_stats_limit_days: i64,
    ) -> DomainResult<Self> {
        let mut services = Vec::new();
        for data in apis.users.get_services_for_user(&user.id).await? {
            services.push(Service::new(data, apis.clone(), activity_stats_limit_days));
        }
        let mut catalogs = Vec::with_capacity(services.len());
        for service in &services {
            catalogs.push((service, service.catalog().await?));
        }
        Ok(Self::new(&catalogs, user))
    }

    pub fn items(&self) -> &[TemplateListItem] {
        &self.items
    }

    pub fn templates_to_show(&self) -> bool {
        self.items.iter().any(TemplateListItem::is_template)
    }
}
