use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME_MAX_CHARS: usize = 255;
/// Bounds the render cost of help text on the inspection screens.
pub const DEFAULT_HINT_MAX_CHARS: usize = 2_000;

/// Sanity limits applied while validating templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLimits {
    pub name_max_chars: usize,
    pub hint_max_chars: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            name_max_chars: DEFAULT_NAME_MAX_CHARS,
            hint_max_chars: DEFAULT_HINT_MAX_CHARS,
        }
    }
}
