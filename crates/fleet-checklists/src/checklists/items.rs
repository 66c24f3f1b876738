use tracing::debug;

use super::document::ItemConfigDocument;
use super::domain::{
    FieldConfig, ItemConfig, ItemType, MediaPolicy, SelectionConfig, SelectionType,
};
use super::schema::limits::DEFAULT_HINT_MAX_CHARS;

/// Item-type rule violations. One error is produced per violated rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("selection items require at least one option")]
    MissingOptions,
    #[error("selection items require a selection_type of `single` or `multiple`")]
    MissingSelectionType,
    #[error("unknown selection_type `{0}`, expected `single` or `multiple`")]
    UnknownSelectionType(String),
    #[error("{item_type} items cannot carry options")]
    UnexpectedOptions { item_type: ItemType },
    #[error("{item_type} items cannot carry a selection_type")]
    UnexpectedSelectionType { item_type: ItemType },
    #[error("hint is {length} characters long, the limit is {max}")]
    HintTooLong { length: usize, max: usize },
}

impl ConfigError {
    pub const fn code(&self) -> &'static str {
        match self {
            ConfigError::MissingOptions => "missing_options",
            ConfigError::MissingSelectionType => "missing_selection_type",
            ConfigError::UnknownSelectionType(_) => "unknown_selection_type",
            ConfigError::UnexpectedOptions { .. } => "unexpected_options",
            ConfigError::UnexpectedSelectionType { .. } => "unexpected_selection_type",
            ConfigError::HintTooLong { .. } => "hint_too_long",
        }
    }
}

/// Interprets the loosely-typed wire config of an item according to its type.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver {
    hint_max_chars: usize,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new(DEFAULT_HINT_MAX_CHARS)
    }
}

impl ConfigResolver {
    pub fn new(hint_max_chars: usize) -> Self {
        Self { hint_max_chars }
    }

    pub fn resolve(
        &self,
        item_type: ItemType,
        raw: &ItemConfigDocument,
    ) -> Result<ItemConfig, Vec<ConfigError>> {
        let mut errors = Vec::new();

        let hint = raw
            .hint
            .as_deref()
            .filter(|hint| !hint.trim().is_empty())
            .map(str::to_string);
        if let Some(hint) = &hint {
            let length = hint.chars().count();
            if length > self.hint_max_chars {
                errors.push(ConfigError::HintTooLong {
                    length,
                    max: self.hint_max_chars,
                });
            }
        }

        let media = MediaPolicy {
            allow_photo: raw.allow_photo,
            allow_attachment: raw.allow_attachment,
        };
        let selection_type = raw
            .selection_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let wrap: fn(FieldConfig) -> ItemConfig = match item_type {
            ItemType::SingleOrMultiSelect => {
                return resolve_selection(raw, selection_type, hint, media, errors)
            }
            ItemType::Text => ItemConfig::Text,
            ItemType::Evaluative => ItemConfig::Evaluative,
            ItemType::Date => ItemConfig::Date,
            ItemType::RegisteredField => ItemConfig::RegisteredField,
        };

        if !raw.options.is_empty() || !raw.selection_options.is_empty() {
            errors.push(ConfigError::UnexpectedOptions { item_type });
        }
        if selection_type.is_some() {
            errors.push(ConfigError::UnexpectedSelectionType { item_type });
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(wrap(FieldConfig { hint, media }))
    }
}

fn resolve_selection(
    raw: &ItemConfigDocument,
    selection_type: Option<&str>,
    hint: Option<String>,
    media: MediaPolicy,
    mut errors: Vec<ConfigError>,
) -> Result<ItemConfig, Vec<ConfigError>> {
    if raw.options.is_empty() {
        errors.push(ConfigError::MissingOptions);
    }

    let selection_type = match selection_type {
        None => {
            errors.push(ConfigError::MissingSelectionType);
            None
        }
        Some(value) => {
            let parsed = SelectionType::parse(value);
            if parsed.is_none() {
                errors.push(ConfigError::UnknownSelectionType(value.to_string()));
            }
            parsed
        }
    };

    match selection_type {
        Some(selection_type) if errors.is_empty() => {
            if raw.selection_options != raw.options {
                debug!(
                    options = raw.options.len(),
                    selection_options = raw.selection_options.len(),
                    "selection_options diverged from options; rewriting from options"
                );
            }
            Ok(ItemConfig::SingleOrMultiSelect(SelectionConfig {
                hint,
                options: raw.options.clone(),
                selection_type,
                media,
            }))
        }
        _ => Err(errors),
    }
}

/// Resolves a config with the default hint cap.
pub fn resolve_config(
    item_type: ItemType,
    raw: &ItemConfigDocument,
) -> Result<ItemConfig, Vec<ConfigError>> {
    ConfigResolver::default().resolve(item_type, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_config(options: &[&str], selection_type: Option<&str>) -> ItemConfigDocument {
        ItemConfigDocument {
            options: options.iter().map(|option| option.to_string()).collect(),
            selection_type: selection_type.map(str::to_string),
            ..ItemConfigDocument::default()
        }
    }

    #[test]
    fn selection_requires_options_and_type() {
        let errors = resolve_config(ItemType::SingleOrMultiSelect, &select_config(&[], None))
            .expect_err("empty selection is rejected");

        assert_eq!(
            errors,
            vec![ConfigError::MissingOptions, ConfigError::MissingSelectionType]
        );
    }

    #[test]
    fn selection_rejects_unknown_selection_type() {
        let errors = resolve_config(
            ItemType::SingleOrMultiSelect,
            &select_config(&["Sim", "Não"], Some("several")),
        )
        .expect_err("unknown selection type");

        assert_eq!(
            errors,
            vec![ConfigError::UnknownSelectionType("several".to_string())]
        );
    }

    #[test]
    fn selection_options_are_rewritten_from_options() {
        let mut raw = select_config(&["Conforme", "Não conforme"], Some("single"));
        raw.selection_options = vec!["stale".to_string()];

        let config = resolve_config(ItemType::SingleOrMultiSelect, &raw).expect("resolves");

        assert_eq!(config.options(), ["Conforme", "Não conforme"]);
        assert_eq!(config.selection_type(), Some(SelectionType::Single));
        let document = ItemConfigDocument::from(&config);
        assert_eq!(document.selection_options, document.options);
    }

    #[test]
    fn plain_items_reject_selection_data() {
        for item_type in ItemType::ALL.into_iter().filter(|kind| !kind.is_selection()) {
            let errors = resolve_config(item_type, &select_config(&["a"], Some("multiple")))
                .expect_err("plain items cannot carry options");
            assert_eq!(
                errors,
                vec![
                    ConfigError::UnexpectedOptions { item_type },
                    ConfigError::UnexpectedSelectionType { item_type },
                ]
            );
        }
    }

    #[test]
    fn plain_items_reject_legacy_selection_options() {
        let raw = ItemConfigDocument {
            selection_options: vec!["a".to_string()],
            ..ItemConfigDocument::default()
        };

        let errors = resolve_config(ItemType::Date, &raw).expect_err("legacy options rejected");
        assert_eq!(
            errors,
            vec![ConfigError::UnexpectedOptions {
                item_type: ItemType::Date
            }]
        );
    }

    #[test]
    fn media_flags_are_independent_on_every_type() {
        let raw = ItemConfigDocument {
            allow_photo: true,
            ..ItemConfigDocument::default()
        };

        let config = resolve_config(ItemType::Evaluative, &raw).expect("resolves");
        assert_eq!(
            config.media(),
            MediaPolicy {
                allow_photo: true,
                allow_attachment: false,
            }
        );
        assert_eq!(config.item_type(), ItemType::Evaluative);
    }

    #[test]
    fn hint_cap_is_enforced_in_characters() {
        let resolver = ConfigResolver::new(4);
        let raw = ItemConfigDocument {
            hint: Some("çççç".to_string()),
            ..ItemConfigDocument::default()
        };
        assert!(resolver.resolve(ItemType::Text, &raw).is_ok());

        let raw = ItemConfigDocument {
            hint: Some("ççççç".to_string()),
            ..ItemConfigDocument::default()
        };
        let errors = resolver
            .resolve(ItemType::Text, &raw)
            .expect_err("hint over the cap");
        assert_eq!(errors, vec![ConfigError::HintTooLong { length: 5, max: 4 }]);
    }

    #[test]
    fn blank_hints_normalize_to_none() {
        let raw = ItemConfigDocument {
            hint: Some("   ".to_string()),
            ..ItemConfigDocument::default()
        };

        let config = resolve_config(ItemType::RegisteredField, &raw).expect("resolves");
        assert_eq!(config.hint(), None);
    }
}
