//! Route gating, navigation and outreach template entry points.
//!
//! None of these touch the database.

use super::{respond, ApiResponse};
use eko_core::templates::{self, Language};
use eko_core::{default_policy, AccessRequest, NavigationAction, NavigationRequest, PolicyEvaluator};
use std::collections::HashMap;

/// One filled-in placeholder, e.g. `First Name` = `Aino`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValue {
    pub name: String,
    pub value: String,
}

/// Whether `role` may perform `action` on `resource` (and record `id`).
///
/// # FFI contract
/// - Unknown roles, resources or actions are simply denied.
#[flutter_rust_bridge::frb(sync)]
pub fn access_can(role: String, resource: String, action: String, id: Option<String>) -> bool {
    let request = AccessRequest::for_route(resource.trim(), action.trim(), id.as_deref());
    default_policy().can(role.trim(), &request)
}

/// Concrete route path, or `None` for unknown resources and actions.
#[flutter_rust_bridge::frb(sync)]
pub fn navigation_path(resource: String, action: String, id: Option<String>) -> Option<String> {
    let action = NavigationAction::parse(&action)?;
    NavigationRequest::to(resource.trim(), action, id.as_deref()).map(|request| request.path)
}

/// Templates for one language (`en|fi`), or all of them when absent.
#[flutter_rust_bridge::frb(sync)]
pub fn template_list(language: Option<String>) -> ApiResponse {
    let result = match language.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => Language::parse(raw)
            .map(|language| templates::templates_for(language).collect::<Vec<_>>())
            .ok_or_else(|| format!("unsupported language: `{raw}`")),
        None => Ok(templates::all_templates().iter().collect::<Vec<_>>()),
    };
    respond("template_list", "Templates loaded.", result)
}

/// Distinct placeholder names in order of first use.
#[flutter_rust_bridge::frb(sync)]
pub fn template_placeholders(template_id: String) -> ApiResponse {
    let result = templates::find_template(template_id.trim())
        .map(templates::placeholders)
        .ok_or_else(|| format!("template not found: `{template_id}`"));
    respond("template_placeholders", "Placeholders loaded.", result)
}

/// Subject and body with known placeholders filled in.
#[flutter_rust_bridge::frb(sync)]
pub fn template_render(template_id: String, values: Vec<TemplateValue>) -> ApiResponse {
    let values = values
        .into_iter()
        .map(|entry| (entry.name, entry.value))
        .collect::<HashMap<_, _>>();
    let result = templates::find_template(template_id.trim())
        .map(|template| templates::render(template, &values))
        .ok_or_else(|| format!("template not found: `{template_id}`"));
    respond("template_render", "Template rendered.", result)
}
