use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Independently toggle-able class of host state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Events,
    Pings,
    Keybinds,
    Models,
    Nameplate,
    Renderer,
    VanillaModel,
    ActionWheel,
    Visibility,
    Store,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Events,
        Category::Pings,
        Category::Keybinds,
        Category::Models,
        Category::Nameplate,
        Category::Renderer,
        Category::VanillaModel,
        Category::ActionWheel,
        Category::Visibility,
        Category::Store,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Events => "events",
            Category::Pings => "pings",
            Category::Keybinds => "keybinds",
            Category::Models => "models",
            Category::Nameplate => "nameplate",
            Category::Renderer => "renderer",
            Category::VanillaModel => "vanilla_model",
            Category::ActionWheel => "action_wheel",
            Category::Visibility => "visibility",
            Category::Store => "store",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enable/disable map keyed by category. Categories missing from the
/// document are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities {
    overrides: BTreeMap<Category, bool>,
}

impl Capabilities {
    pub fn all_enabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        self.overrides.get(&category).copied().unwrap_or(true)
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        self.overrides.insert(category, enabled);
    }

    pub fn with(mut self, category: Category, enabled: bool) -> Self {
        self.set(category, enabled);
        self
    }

    pub fn enabled(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(move |category| self.is_enabled(*category))
    }
}

#[cfg(test)]
mod tests {
    use super::{Capabilities, Category};

    #[test]
    fn missing_categories_default_to_enabled() {
        let caps: Capabilities =
            serde_json::from_str(r#"{ "store": false, "renderer": true }"#).expect("caps parse");
        assert!(!caps.is_enabled(Category::Store));
        assert!(caps.is_enabled(Category::Renderer));
        assert!(caps.is_enabled(Category::Events));
        assert_eq!(caps.enabled().count(), Category::ALL.len() - 1);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let parsed = serde_json::from_str::<Capabilities>(r#"{ "sound": false }"#);
        assert!(parsed.is_err());
    }
}
