use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::HostState;
use crate::types::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartField {
    Visible,
    Pos,
    Rot,
    Scale,
    Pivot,
    Color,
    Opacity,
    PrimaryTexture,
}

impl PartField {
    pub const ALL: [PartField; 8] = [
        PartField::Visible,
        PartField::Pos,
        PartField::Rot,
        PartField::Scale,
        PartField::Pivot,
        PartField::Color,
        PartField::Opacity,
        PartField::PrimaryTexture,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PartField::Visible => "visible",
            PartField::Pos => "pos",
            PartField::Rot => "rot",
            PartField::Scale => "scale",
            PartField::Pivot => "pivot",
            PartField::Color => "color",
            PartField::Opacity => "opacity",
            PartField::PrimaryTexture => "primary_texture",
        }
    }

    pub fn setter(self) -> &'static str {
        match self {
            PartField::Visible => "setVisible",
            PartField::Pos => "setPos",
            PartField::Rot => "setRot",
            PartField::Scale => "setScale",
            PartField::Pivot => "setPivot",
            PartField::Color => "setColor",
            PartField::Opacity => "setOpacity",
            PartField::PrimaryTexture => "setPrimaryTexture",
        }
    }

    pub fn getter(self) -> &'static str {
        match self {
            PartField::Visible => "getVisible",
            PartField::Pos => "getPos",
            PartField::Rot => "getRot",
            PartField::Scale => "getScale",
            PartField::Pivot => "getPivot",
            PartField::Color => "getColor",
            PartField::Opacity => "getOpacity",
            PartField::PrimaryTexture => "getPrimaryTexture",
        }
    }
}

/// One part override, typed per field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PartValue {
    Visible(bool),
    Pos(Vec3),
    Rot(Vec3),
    Scale(Vec3),
    Pivot(Vec3),
    Color(Vec3),
    Opacity(f64),
    PrimaryTexture(String),
}

impl fmt::Display for PartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartValue::Visible(flag) => write!(f, "{flag}"),
            PartValue::Pos(v)
            | PartValue::Rot(v)
            | PartValue::Scale(v)
            | PartValue::Pivot(v)
            | PartValue::Color(v) => write!(f, "{v}"),
            PartValue::Opacity(value) => write!(f, "{value}"),
            PartValue::PrimaryTexture(name) => f.write_str(name),
        }
    }
}

/// Identity of one overridable (part, field) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PartKey {
    pub part: String,
    pub field: PartField,
}

impl PartKey {
    pub fn new(part: impl Into<String>, field: PartField) -> Self {
        PartKey {
            part: part.into(),
            field,
        }
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.part, self.field.as_str())
    }
}

/// Parts are addressed by dotted path; the first component names the
/// top-level group an environment can own.
#[derive(Debug, Default)]
pub(super) struct ModelHost {
    overrides: BTreeMap<PartKey, PartValue>,
    hidden_groups: BTreeSet<String>,
}

impl ModelHost {
    pub(super) fn overrides(&self) -> impl Iterator<Item = (&PartKey, &PartValue)> {
        self.overrides.iter()
    }

    pub(super) fn hidden_groups(&self) -> impl Iterator<Item = &String> {
        self.hidden_groups.iter()
    }
}

impl HostState {
    pub fn set_part_field(&mut self, key: &PartKey, value: Option<PartValue>) {
        match value {
            Some(value) => {
                self.log(format!("models.{}.{} {}", key.part, key.field.setter(), value));
                self.models.overrides.insert(key.clone(), value);
            }
            None => {
                self.log(format!("models.{}.{}", key.part, key.field.setter()));
                self.models.overrides.remove(key);
            }
        }
    }

    pub fn part_field(&self, key: &PartKey) -> Option<&PartValue> {
        self.models.overrides.get(key)
    }

    pub fn set_group_visible(&mut self, group: &str, visible: bool) {
        self.log(format!("models.{group}.groupVisible {visible}"));
        if visible {
            self.models.hidden_groups.remove(group);
        } else {
            self.models.hidden_groups.insert(group.to_string());
        }
    }

    pub fn group_visible(&self, group: &str) -> bool {
        !self.models.hidden_groups.contains(group)
    }

    /// Whether a part would be drawn: its group is shown and no part on its
    /// path carries a `visible = false` override.
    pub fn part_rendered(&self, part: &str) -> bool {
        let group = part.split('.').next().unwrap_or(part);
        if !self.group_visible(group) {
            return false;
        }
        let mut prefix = String::new();
        for component in part.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(component);
            let key = PartKey::new(prefix.clone(), PartField::Visible);
            if let Some(PartValue::Visible(false)) = self.models.overrides.get(&key) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{PartField, PartKey, PartValue};
    use crate::host::HostState;
    use crate::types::Vec3;

    #[test]
    fn setters_journal_and_clear() {
        let mut host = HostState::new();
        let key = PartKey::new("alice.head", PartField::Pos);
        host.set_part_field(&key, Some(PartValue::Pos(Vec3::new(1.0, 2.0, 3.0))));
        assert_eq!(
            host.part_field(&key),
            Some(&PartValue::Pos(Vec3::new(1.0, 2.0, 3.0)))
        );
        host.set_part_field(&key, None);
        assert!(host.part_field(&key).is_none());
        assert_eq!(
            host.journal(),
            ["models.alice.head.setPos 1 2 3", "models.alice.head.setPos"]
        );
    }

    #[test]
    fn rendering_follows_group_and_ancestors() {
        let mut host = HostState::new();
        assert!(host.part_rendered("alice.head.hat"));
        host.set_part_field(
            &PartKey::new("alice.head", PartField::Visible),
            Some(PartValue::Visible(false)),
        );
        assert!(!host.part_rendered("alice.head.hat"));
        assert!(host.part_rendered("alice.body"));
        host.set_group_visible("alice", false);
        assert!(!host.part_rendered("alice.body"));
    }
}
