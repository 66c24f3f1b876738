//! Template schema validation.
//!
//! Validation never stops at the first problem: every rule runs over the whole document and
//! the complete list of violations is returned so an author can fix everything in one pass.

mod errors;
pub mod limits;
mod walk;

pub use errors::{NodePath, SchemaError, SchemaErrorView, ValidationFailure};
pub use limits::ValidationLimits;

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::document::{AreaDocument, ItemDocument, TemplateDocument};
use super::domain::{
    Area, AreaId, AreaKind, ChecklistTemplate, Item, ItemId, ItemType, UserId, VehicleTypeRef,
};
use super::items::ConfigResolver;
use walk::{flatten_items, visit_areas, FlatItem};

/// Stateless validator applying the configured limits to template documents.
#[derive(Debug, Clone)]
pub struct TemplateValidator {
    limits: ValidationLimits,
    resolver: ConfigResolver,
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self::new(ValidationLimits::default())
    }
}

impl TemplateValidator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self {
            limits,
            resolver: ConfigResolver::new(limits.hint_max_chars),
        }
    }

    pub fn limits(&self) -> ValidationLimits {
        self.limits
    }

    /// Validate a document and return its normalized form, or every violation found.
    pub fn validate(
        &self,
        document: &TemplateDocument,
    ) -> Result<ChecklistTemplate, Vec<SchemaError>> {
        let areas = &document.structure.areas;
        let flat = flatten_items(areas);
        let mut errors = Vec::new();

        self.check_name(document.name.as_deref(), &mut errors);
        check_area_names(areas, &mut errors);
        check_item_types(&flat, &mut errors);
        check_item_ids(&flat, &mut errors);
        check_area_ids(areas, &NodePath::structure(), "areas", &mut errors);
        if !areas.is_empty() && flat.is_empty() {
            errors.push(SchemaError::NoItems);
        }

        let structure = self.build_areas(areas, &NodePath::structure(), "areas", &mut errors);

        debug!(
            areas = areas.len(),
            items = flat.len(),
            placeholders = structure.iter().filter(|area| area.is_placeholder()).count(),
            errors = errors.len(),
            "template validated"
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ChecklistTemplate {
            name: document.name.as_deref().unwrap_or_default().trim().to_string(),
            subject: document.subject.clone().unwrap_or_default(),
            description: document.description.clone().unwrap_or_default(),
            settings: document.settings,
            structure,
            target_vehicle_types: trimmed_references(&document.target_vehicle_types)
                .map(VehicleTypeRef::new)
                .collect::<BTreeSet<_>>(),
            assigned_user_ids: trimmed_references(&document.assigned_user_ids)
                .map(UserId::new)
                .collect::<BTreeSet<_>>(),
        })
    }

    /// Parse and validate raw JSON, keeping unreadable input distinct from rule violations.
    pub fn validate_json(&self, raw: &str) -> Result<ChecklistTemplate, ValidationFailure> {
        let document = TemplateDocument::from_json(raw)?;
        self.validate(&document).map_err(ValidationFailure::Invalid)
    }

    fn check_name(&self, name: Option<&str>, errors: &mut Vec<SchemaError>) {
        let Some(name) = name else {
            errors.push(SchemaError::MissingField {
                path: NodePath::template(),
                field: "name",
            });
            return;
        };

        let trimmed = name.trim();
        if trimmed.is_empty() {
            errors.push(SchemaError::EmptyTemplateName);
            return;
        }

        let length = trimmed.chars().count();
        if length > self.limits.name_max_chars {
            errors.push(SchemaError::TemplateNameTooLong {
                length,
                max: self.limits.name_max_chars,
            });
        }
    }

    fn build_areas(
        &self,
        areas: &[AreaDocument],
        parent: &NodePath,
        segment: &str,
        errors: &mut Vec<SchemaError>,
    ) -> Vec<Area> {
        let mut built = Vec::with_capacity(areas.len());

        for (index, area) in areas.iter().enumerate() {
            let path = parent.child(segment, index);

            let mut items = Vec::with_capacity(area.items.len());
            for (item_index, item) in area.items.iter().enumerate() {
                let item_path = path.child("items", item_index);
                if let Some(item) = self.build_item(item, item_path, errors) {
                    items.push(item);
                }
            }

            let sub_areas = self.build_areas(&area.sub_areas, &path, "sub_areas", errors);

            built.push(Area {
                id: AreaId::new(area.id.clone().unwrap_or_default()),
                name: area.name.clone().unwrap_or_default(),
                kind: AreaKind::from_wire(area.kind.as_deref()),
                items,
                sub_areas,
            });
        }

        built
    }

    /// Items whose type is missing or unknown were already reported and are skipped here.
    fn build_item(
        &self,
        item: &ItemDocument,
        path: NodePath,
        errors: &mut Vec<SchemaError>,
    ) -> Option<Item> {
        let item_type = item.item_type.as_deref().and_then(ItemType::parse)?;
        let item_id = item.id.clone().unwrap_or_default();

        match self.resolver.resolve(item_type, &item.config) {
            Ok(config) => Some(Item {
                id: ItemId::new(item_id),
                name: item.name.clone().unwrap_or_default(),
                config,
            }),
            Err(config_errors) => {
                errors.extend(
                    config_errors
                        .into_iter()
                        .map(|source| SchemaError::ItemConfig {
                            path: path.clone(),
                            item_id: item_id.clone(),
                            source,
                        }),
                );
                None
            }
        }
    }
}

fn check_area_names(areas: &[AreaDocument], errors: &mut Vec<SchemaError>) {
    visit_areas(areas, &mut |path: &NodePath, area: &AreaDocument| {
        let named = area
            .name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false);
        if !named {
            errors.push(SchemaError::EmptyAreaName { path: path.clone() });
        }
    });
}

fn check_item_types(flat: &[FlatItem<'_>], errors: &mut Vec<SchemaError>) {
    for entry in flat {
        match entry.item.item_type.as_deref().map(str::trim) {
            None | Some("") => errors.push(SchemaError::MissingField {
                path: entry.path.clone(),
                field: "type",
            }),
            Some(raw) if ItemType::parse(raw).is_none() => {
                errors.push(SchemaError::UnknownItemType {
                    path: entry.path.clone(),
                    found: raw.to_string(),
                })
            }
            Some(_) => {}
        }
    }
}

/// Item ids share one namespace across every area and sub-area of the template.
fn check_item_ids(flat: &[FlatItem<'_>], errors: &mut Vec<SchemaError>) {
    let mut first_seen: HashMap<&str, &NodePath> = HashMap::new();

    for entry in flat {
        let Some(id) = entry.item.id.as_deref().filter(|id| !id.trim().is_empty()) else {
            errors.push(SchemaError::MissingField {
                path: entry.path.clone(),
                field: "id",
            });
            continue;
        };

        match first_seen.get(id) {
            Some(first) => errors.push(SchemaError::DuplicateItemId {
                id: id.to_string(),
                first: (*first).clone(),
                second: entry.path.clone(),
            }),
            None => {
                first_seen.insert(id, &entry.path);
            }
        }
    }
}

/// Area ids only need to be unique within one sibling list.
fn check_area_ids(
    areas: &[AreaDocument],
    parent: &NodePath,
    segment: &str,
    errors: &mut Vec<SchemaError>,
) {
    let mut first_seen: HashMap<&str, NodePath> = HashMap::new();

    for (index, area) in areas.iter().enumerate() {
        let path = parent.child(segment, index);

        match area.id.as_deref().filter(|id| !id.trim().is_empty()) {
            None => errors.push(SchemaError::MissingField {
                path: path.clone(),
                field: "id",
            }),
            Some(id) => match first_seen.get(id) {
                Some(first) => errors.push(SchemaError::DuplicateAreaId {
                    id: id.to_string(),
                    first: first.clone(),
                    second: path.clone(),
                }),
                None => {
                    first_seen.insert(id, path.clone());
                }
            },
        }

        check_area_ids(&area.sub_areas, &path, "sub_areas", errors);
    }
}

/// Blank entries are dropped so they cannot narrow a target list to nothing.
fn trimmed_references<'a>(raw: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
    raw.iter()
        .map(|reference| reference.trim())
        .filter(|reference| !reference.is_empty())
}

/// Validate with the default limits.
pub fn validate(document: &TemplateDocument) -> Result<ChecklistTemplate, Vec<SchemaError>> {
    TemplateValidator::default().validate(document)
}
