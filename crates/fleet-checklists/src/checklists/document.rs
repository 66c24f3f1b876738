//! Storage-boundary shape of a template. Every field is optional or defaulted so that a
//! missing value surfaces as a schema error instead of a parse failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::domain::{Area, ChecklistTemplate, Item, ItemConfig, Settings, TemplateRecord};

/// Raised when the input cannot be read as a template document at all.
#[derive(Debug, thiserror::Error)]
#[error("malformed template document: {reason}")]
pub struct MalformedInput {
    pub reason: String,
}

impl MalformedInput {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub settings: Settings,
    #[serde(deserialize_with = "null_as_default")]
    pub structure: StructureDocument,
    #[serde(deserialize_with = "null_as_default")]
    pub target_vehicle_types: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub assigned_user_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub areas: Vec<AreaDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaDocument {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<ItemDocument>,
    #[serde(deserialize_with = "null_as_default")]
    pub sub_areas: Vec<AreaDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDocument {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub config: ItemConfigDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfigDocument {
    pub hint: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub selection_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub allow_photo: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub allow_attachment: bool,
}

/// Authoring tools write `null` for untouched collections and switches; read it as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TemplateDocument {
    pub fn from_json(raw: &str) -> Result<Self, MalformedInput> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| MalformedInput::new(format!("invalid JSON: {err}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, MalformedInput> {
        if !value.is_object() {
            return Err(MalformedInput::new("expected a JSON object at the top level"));
        }

        serde_json::from_value(value).map_err(|err| MalformedInput::new(err.to_string()))
    }
}

impl From<&ChecklistTemplate> for TemplateDocument {
    fn from(template: &ChecklistTemplate) -> Self {
        Self {
            id: None,
            name: Some(template.name.clone()),
            subject: Some(template.subject.clone()),
            description: Some(template.description.clone()),
            settings: template.settings,
            structure: StructureDocument {
                areas: template.structure.iter().map(AreaDocument::from).collect(),
            },
            target_vehicle_types: template
                .target_vehicle_types
                .iter()
                .map(|reference| reference.0.clone())
                .collect(),
            assigned_user_ids: template
                .assigned_user_ids
                .iter()
                .map(|user| user.0.clone())
                .collect(),
        }
    }
}

impl From<&TemplateRecord> for TemplateDocument {
    fn from(record: &TemplateRecord) -> Self {
        let mut document = TemplateDocument::from(&record.template);
        document.id = Some(record.id.0.clone());
        document
    }
}

impl From<&Area> for AreaDocument {
    fn from(area: &Area) -> Self {
        Self {
            id: Some(area.id.0.clone()),
            name: Some(area.name.clone()),
            kind: Some(area.kind.label().to_string()),
            items: area.items.iter().map(ItemDocument::from).collect(),
            sub_areas: area.sub_areas.iter().map(AreaDocument::from).collect(),
        }
    }
}

impl From<&Item> for ItemDocument {
    fn from(item: &Item) -> Self {
        Self {
            id: Some(item.id.0.clone()),
            name: Some(item.name.clone()),
            item_type: Some(item.item_type().label().to_string()),
            config: ItemConfigDocument::from(&item.config),
        }
    }
}

impl From<&ItemConfig> for ItemConfigDocument {
    fn from(config: &ItemConfig) -> Self {
        let media = config.media();
        // `selection_options` is a legacy mirror of `options` and is always written from it.
        let options = config.options().to_vec();
        Self {
            hint: config.hint().map(str::to_string),
            selection_options: options.clone(),
            options,
            selection_type: config
                .selection_type()
                .map(|selection| selection.label().to_string()),
            allow_photo: media.allow_photo,
            allow_attachment: media.allow_attachment,
        }
    }
}

