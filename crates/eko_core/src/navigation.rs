//! Static resource registry and navigation requests.
//!
//! The UI router is external. Services hand back a [`NavigationRequest`]
//! naming where the user should land; the router only has to follow `path`.

use serde::Serialize;

const ID_PLACEHOLDER: &str = ":id";

/// Route kinds a resource may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationAction {
    List,
    Create,
    Edit,
    Show,
}

impl NavigationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Show => "show",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" => Some(Self::List),
            "create" => Some(Self::Create),
            "edit" => Some(Self::Edit),
            "show" => Some(Self::Show),
            _ => None,
        }
    }
}

/// One registered resource and its route templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceDef {
    pub name: &'static str,
    pub label: &'static str,
    /// Menu group the entry is nested under.
    pub parent: Option<&'static str>,
    pub list: Option<&'static str>,
    pub create: Option<&'static str>,
    pub edit: Option<&'static str>,
    pub show: Option<&'static str>,
    pub can_delete: bool,
}

impl ResourceDef {
    const fn listing(name: &'static str, label: &'static str, list: &'static str) -> Self {
        Self {
            name,
            label,
            parent: None,
            list: Some(list),
            create: None,
            edit: None,
            show: None,
            can_delete: false,
        }
    }

    pub fn template(&self, action: NavigationAction) -> Option<&'static str> {
        match action {
            NavigationAction::List => self.list,
            NavigationAction::Create => self.create,
            NavigationAction::Edit => self.edit,
            NavigationAction::Show => self.show,
        }
    }
}

pub static RESOURCES: &[ResourceDef] = &[
    ResourceDef::listing("home", "Home", "/home"),
    ResourceDef::listing("dash", "Dashboard", "/eko/dash"),
    ResourceDef {
        can_delete: true,
        ..ResourceDef::listing("todolist", "Todo List", "/todolist")
    },
    ResourceDef {
        edit: Some("/notes/edit/:id"),
        can_delete: true,
        ..ResourceDef::listing("notes", "Notes", "/notes")
    },
    ResourceDef {
        edit: Some("/profile/edit/:id"),
        ..ResourceDef::listing("profile", "Profile", "/profile")
    },
    ResourceDef::listing("blog", "Blog", "/blog"),
    ResourceDef {
        parent: Some("crm_dropdown"),
        create: Some("/crm/prospects/create"),
        edit: Some("/crm/prospects/edit/:id"),
        show: Some("/crm/prospects/show/:id"),
        can_delete: true,
        ..ResourceDef::listing("prospects", "Prospects", "/crm/prospects")
    },
    ResourceDef {
        create: Some("/eko/dash/blogs/create"),
        edit: Some("/eko/dash/blogs/edit/:id"),
        show: Some("/eko/dash/blogs/show/:id"),
        can_delete: true,
        ..ResourceDef::listing("blogs", "Blogs", "/eko/dash/blogs")
    },
    ResourceDef {
        parent: Some("resources_drop"),
        ..ResourceDef::listing("resources", "Resources", "/eko/resources")
    },
];

pub fn find_resource(name: &str) -> Option<&'static ResourceDef> {
    RESOURCES.iter().find(|resource| resource.name == name)
}

/// Resolved "go here next" instruction for the UI router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationRequest {
    pub resource: &'static str,
    pub action: NavigationAction,
    pub id: Option<String>,
    pub path: String,
}

impl NavigationRequest {
    /// Resolves `resource`/`action` to a concrete path.
    ///
    /// Returns `None` for unknown resources, actions the resource does not
    /// route, and `:id` templates called without an id.
    pub fn to(resource: &str, action: NavigationAction, id: Option<&str>) -> Option<Self> {
        let def = find_resource(resource)?;
        let template = def.template(action)?;
        let (path, id) = if template.contains(ID_PLACEHOLDER) {
            let id = id.map(str::trim).filter(|value| !value.is_empty())?;
            (template.replace(ID_PLACEHOLDER, id), Some(id.to_string()))
        } else {
            (template.to_string(), None)
        };
        Some(Self {
            resource: def.name,
            action,
            id,
            path,
        })
    }

    pub fn show(resource: &str, id: impl ToString) -> Option<Self> {
        Self::to(resource, NavigationAction::Show, Some(&id.to_string()))
    }

    pub fn list(resource: &str) -> Option<Self> {
        Self::to(resource, NavigationAction::List, None)
    }
}
