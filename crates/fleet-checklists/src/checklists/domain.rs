use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Opaque template identifier, generated once at creation and never reassigned.
    TemplateId
);
string_id!(
    /// Area identifier, unique among its direct siblings.
    AreaId
);
string_id!(
    /// Item identifier, unique across the whole flattened template.
    ItemId
);
string_id!(VehicleId);
string_id!(
    /// Reference to a vehicle type in the fleet catalog (e.g. "Cavalo Mecânico").
    VehicleTypeRef
);
string_id!(UserId);

impl TemplateId {
    /// Timestamp plus a random suffix, unique without any coordination between writers.
    pub fn generate() -> Self {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        Self(format!("tpl-{stamp}-{}", Uuid::new_v4().simple()))
    }
}

/// Closed set of item kinds an inspector can be asked to fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Text,
    Evaluative,
    SingleOrMultiSelect,
    Date,
    RegisteredField,
}

impl ItemType {
    pub const ALL: [ItemType; 5] = [
        ItemType::Text,
        ItemType::Evaluative,
        ItemType::SingleOrMultiSelect,
        ItemType::Date,
        ItemType::RegisteredField,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ItemType::Text => "Text",
            ItemType::Evaluative => "Evaluative",
            ItemType::SingleOrMultiSelect => "SingleOrMultiSelect",
            ItemType::Date => "Date",
            ItemType::RegisteredField => "RegisteredField",
        }
    }

    /// Accepts the canonical names and their snake_case spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Text" | "text" => Some(ItemType::Text),
            "Evaluative" | "evaluative" => Some(ItemType::Evaluative),
            "SingleOrMultiSelect" | "single_or_multi_select" => {
                Some(ItemType::SingleOrMultiSelect)
            }
            "Date" | "date" => Some(ItemType::Date),
            "RegisteredField" | "registered_field" => Some(ItemType::RegisteredField),
            _ => None,
        }
    }

    pub const fn is_selection(self) -> bool {
        matches!(self, ItemType::SingleOrMultiSelect)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionType {
    Single,
    Multiple,
}

impl SelectionType {
    pub const fn label(self) -> &'static str {
        match self {
            SelectionType::Single => "single",
            SelectionType::Multiple => "multiple",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "single" => Some(SelectionType::Single),
            "multiple" => Some(SelectionType::Multiple),
            _ => None,
        }
    }
}

/// Runtime flags that change how an inspection built from the template is conducted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Only completable through the field app, never the desktop portal.
    pub app_only: bool,
    /// One response may be applied to several similar items at once.
    pub bulk_answer: bool,
    /// Completed inspections are e-mailed to the configured recipients.
    pub share_email: bool,
    /// Photo items may be satisfied from the gallery instead of a live capture.
    pub allow_gallery: bool,
    pub geo_fence_start: bool,
    pub geo_fence_end: bool,
    /// Inspections may be saved and resumed before completion.
    pub partial_result: bool,
    pub mandatory_signature: bool,
}

impl Settings {
    pub fn enabled_flags(&self) -> Vec<&'static str> {
        [
            ("app_only", self.app_only),
            ("bulk_answer", self.bulk_answer),
            ("share_email", self.share_email),
            ("allow_gallery", self.allow_gallery),
            ("geo_fence_start", self.geo_fence_start),
            ("geo_fence_end", self.geo_fence_end),
            ("partial_result", self.partial_result),
            ("mandatory_signature", self.mandatory_signature),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }
}

/// Area kind. Only `standard` is recognized today; other kinds are carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AreaKind {
    #[default]
    Standard,
    Other(String),
}

impl AreaKind {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("standard") => AreaKind::Standard,
            Some(other) => AreaKind::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AreaKind::Standard => "standard",
            AreaKind::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaPolicy {
    pub allow_photo: bool,
    pub allow_attachment: bool,
}

/// Configuration shared by the free-form item kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldConfig {
    pub hint: Option<String>,
    pub media: MediaPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionConfig {
    pub hint: Option<String>,
    pub options: Vec<String>,
    pub selection_type: SelectionType,
    pub media: MediaPolicy,
}

/// Item configuration keyed by item type, so a text item cannot carry selection data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemConfig {
    Text(FieldConfig),
    Evaluative(FieldConfig),
    SingleOrMultiSelect(SelectionConfig),
    Date(FieldConfig),
    RegisteredField(FieldConfig),
}

impl ItemConfig {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemConfig::Text(_) => ItemType::Text,
            ItemConfig::Evaluative(_) => ItemType::Evaluative,
            ItemConfig::SingleOrMultiSelect(_) => ItemType::SingleOrMultiSelect,
            ItemConfig::Date(_) => ItemType::Date,
            ItemConfig::RegisteredField(_) => ItemType::RegisteredField,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            ItemConfig::SingleOrMultiSelect(config) => config.hint.as_deref(),
            ItemConfig::Text(config)
            | ItemConfig::Evaluative(config)
            | ItemConfig::Date(config)
            | ItemConfig::RegisteredField(config) => config.hint.as_deref(),
        }
    }

    pub fn media(&self) -> MediaPolicy {
        match self {
            ItemConfig::SingleOrMultiSelect(config) => config.media,
            ItemConfig::Text(config)
            | ItemConfig::Evaluative(config)
            | ItemConfig::Date(config)
            | ItemConfig::RegisteredField(config) => config.media,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            ItemConfig::SingleOrMultiSelect(config) => &config.options,
            _ => &[],
        }
    }

    pub fn selection_type(&self) -> Option<SelectionType> {
        match self {
            ItemConfig::SingleOrMultiSelect(config) => Some(config.selection_type),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub config: ItemConfig,
}

impl Item {
    pub fn item_type(&self) -> ItemType {
        self.config.item_type()
    }
}

/// Grouping node of the template tree. Sub-areas share the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub kind: AreaKind,
    pub items: Vec<Item>,
    pub sub_areas: Vec<Area>,
}

impl Area {
    pub fn item_count(&self) -> usize {
        self.items.len() + self.sub_areas.iter().map(Area::item_count).sum::<usize>()
    }

    /// Areas with neither items nor sub-areas, kept as headings (e.g. an "Aviso" notice).
    pub fn is_placeholder(&self) -> bool {
        self.items.is_empty() && self.sub_areas.is_empty()
    }

    fn collect_items<'a>(&'a self, out: &mut Vec<&'a Item>) {
        out.extend(self.items.iter());
        for sub_area in &self.sub_areas {
            sub_area.collect_items(out);
        }
    }
}

/// A validated, normalized inspection template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistTemplate {
    pub name: String,
    pub subject: String,
    pub description: String,
    pub settings: Settings,
    pub structure: Vec<Area>,
    pub target_vehicle_types: BTreeSet<VehicleTypeRef>,
    pub assigned_user_ids: BTreeSet<UserId>,
}

impl ChecklistTemplate {
    /// Items in depth-first order: an area's own items, then each sub-area in turn.
    pub fn items(&self) -> Vec<&Item> {
        let mut items = Vec::new();
        for area in &self.structure {
            area.collect_items(&mut items);
        }
        items
    }

    pub fn item_count(&self) -> usize {
        self.structure.iter().map(Area::item_count).sum()
    }

    pub fn is_inert(&self) -> bool {
        self.structure.is_empty()
    }

    pub fn targets_every_vehicle_type(&self) -> bool {
        self.target_vehicle_types.is_empty()
    }

    pub fn targets_every_user(&self) -> bool {
        self.assigned_user_ids.is_empty()
    }
}

/// Stored form of a template: the normalized body plus its identity and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRecord {
    pub id: TemplateId,
    pub template: ChecklistTemplate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TemplateRecord {
    pub fn new(id: TemplateId, template: ChecklistTemplate) -> Self {
        let now = Utc::now();
        Self {
            id,
            template,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full-structure replacement; identity and creation time are preserved.
    pub fn replaced_with(&self, template: ChecklistTemplate) -> Self {
        Self {
            id: self.id.clone(),
            template,
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    pub fn summary_view(&self) -> TemplateSummaryView {
        TemplateSummaryView {
            id: self.id.clone(),
            name: self.template.name.clone(),
            subject: self.template.subject.clone(),
            area_count: self.template.structure.len(),
            item_count: self.template.item_count(),
            settings: self.template.settings.enabled_flags(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummaryView {
    pub id: TemplateId,
    pub name: String,
    pub subject: String,
    pub area_count: usize,
    pub item_count: usize,
    pub settings: Vec<&'static str>,
    pub updated_at: DateTime<Utc>,
}
