use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::HostState;
use crate::types::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NameplateSlot {
    Chat,
    Entity,
    List,
}

impl NameplateSlot {
    pub const ALL: [NameplateSlot; 3] = [
        NameplateSlot::Chat,
        NameplateSlot::Entity,
        NameplateSlot::List,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NameplateSlot::Chat => "CHAT",
            NameplateSlot::Entity => "ENTITY",
            NameplateSlot::List => "LIST",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Default)]
pub(super) struct NameplateHost {
    texts: BTreeMap<NameplateSlot, String>,
}

impl NameplateHost {
    pub(super) fn iter(&self) -> impl Iterator<Item = (&NameplateSlot, &String)> {
        self.texts.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererField {
    ShadowRadius,
    Fov,
    RenderFire,
    RenderVehicle,
    CameraOffset,
}

impl RendererField {
    pub const ALL: [RendererField; 5] = [
        RendererField::ShadowRadius,
        RendererField::Fov,
        RendererField::RenderFire,
        RendererField::RenderVehicle,
        RendererField::CameraOffset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RendererField::ShadowRadius => "shadow_radius",
            RendererField::Fov => "fov",
            RendererField::RenderFire => "render_fire",
            RendererField::RenderVehicle => "render_vehicle",
            RendererField::CameraOffset => "camera_offset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RendererValue {
    ShadowRadius(f64),
    Fov(f64),
    RenderFire(bool),
    RenderVehicle(bool),
    CameraOffset(Vec3),
}

impl fmt::Display for RendererValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererValue::ShadowRadius(value) | RendererValue::Fov(value) => write!(f, "{value}"),
            RendererValue::RenderFire(flag) | RendererValue::RenderVehicle(flag) => {
                write!(f, "{flag}")
            }
            RendererValue::CameraOffset(offset) => write!(f, "{offset}"),
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct RendererHost {
    settings: BTreeMap<RendererField, RendererValue>,
}

impl RendererHost {
    pub(super) fn iter(&self) -> impl Iterator<Item = (&RendererField, &RendererValue)> {
        self.settings.iter()
    }
}

/// Parts of the host's built-in player model, plus the groups that address
/// several of them at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum VanillaPart {
    Head,
    Body,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
    Hat,
    Cape,
    All,
    Inner,
    Outer,
}

impl VanillaPart {
    pub const EVERY: [VanillaPart; 11] = [
        VanillaPart::Head,
        VanillaPart::Body,
        VanillaPart::LeftArm,
        VanillaPart::RightArm,
        VanillaPart::LeftLeg,
        VanillaPart::RightLeg,
        VanillaPart::Hat,
        VanillaPart::Cape,
        VanillaPart::All,
        VanillaPart::Inner,
        VanillaPart::Outer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VanillaPart::Head => "HEAD",
            VanillaPart::Body => "BODY",
            VanillaPart::LeftArm => "LEFT_ARM",
            VanillaPart::RightArm => "RIGHT_ARM",
            VanillaPart::LeftLeg => "LEFT_LEG",
            VanillaPart::RightLeg => "RIGHT_LEG",
            VanillaPart::Hat => "HAT",
            VanillaPart::Cape => "CAPE",
            VanillaPart::All => "ALL",
            VanillaPart::Inner => "INNER",
            VanillaPart::Outer => "OUTER",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::EVERY
            .into_iter()
            .find(|part| part.as_str().eq_ignore_ascii_case(name))
    }

    /// Concrete parts written by a setter on this entry.
    pub fn members(self) -> &'static [VanillaPart] {
        use VanillaPart::*;
        match self {
            All => &[Head, Body, LeftArm, RightArm, LeftLeg, RightLeg, Hat, Cape],
            Inner => &[Head, Body, LeftArm, RightArm, LeftLeg, RightLeg],
            Outer => &[Hat, Cape],
            Head => &[Head],
            Body => &[Body],
            LeftArm => &[LeftArm],
            RightArm => &[RightArm],
            LeftLeg => &[LeftLeg],
            RightLeg => &[RightLeg],
            Hat => &[Hat],
            Cape => &[Cape],
        }
    }

    pub fn is_group(self) -> bool {
        matches!(self, VanillaPart::All | VanillaPart::Inner | VanillaPart::Outer)
    }
}

/// Visibility overrides. A group setter stores its own slot and overwrites
/// every member, so the last writer wins per concrete part.
#[derive(Debug, Default)]
pub(super) struct VanillaHost {
    visible: BTreeMap<VanillaPart, bool>,
}

impl VanillaHost {
    pub(super) fn iter(&self) -> impl Iterator<Item = (&VanillaPart, &bool)> {
        self.visible.iter()
    }
}

impl HostState {
    pub fn set_nameplate_text(&mut self, slot: NameplateSlot, text: Option<String>) {
        match text {
            Some(text) => {
                self.log(format!("nameplate.{}.setText {text}", slot.as_str()));
                self.nameplate.texts.insert(slot, text);
            }
            None => {
                self.log(format!("nameplate.{}.setText", slot.as_str()));
                self.nameplate.texts.remove(&slot);
            }
        }
    }

    pub fn nameplate_text(&self, slot: NameplateSlot) -> Option<&str> {
        self.nameplate.texts.get(&slot).map(|text| text.as_str())
    }

    pub fn set_renderer(&mut self, field: RendererField, value: Option<RendererValue>) {
        match value {
            Some(value) => {
                self.log(format!("renderer.{} {value}", field.as_str()));
                self.renderer.settings.insert(field, value);
            }
            None => {
                self.log(format!("renderer.{} reset", field.as_str()));
                self.renderer.settings.remove(&field);
            }
        }
    }

    pub fn renderer(&self, field: RendererField) -> Option<&RendererValue> {
        self.renderer.settings.get(&field)
    }

    pub fn set_vanilla_visible(&mut self, part: VanillaPart, visible: Option<bool>) {
        match visible {
            Some(flag) => self.log(format!("vanilla_model.{}.setVisible {flag}", part.as_str())),
            None => self.log(format!("vanilla_model.{}.setVisible", part.as_str())),
        }
        let targets = std::iter::once(part).chain(part.members().iter().copied());
        for target in targets {
            match visible {
                Some(flag) => {
                    self.vanilla.visible.insert(target, flag);
                }
                None => {
                    self.vanilla.visible.remove(&target);
                }
            }
        }
    }

    /// Raw override slot for `part`; `None` means the host default.
    pub fn vanilla_visible(&self, part: VanillaPart) -> Option<bool> {
        self.vanilla.visible.get(&part).copied()
    }

    pub fn vanilla_rendered(&self, part: VanillaPart) -> bool {
        self.vanilla_visible(part).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{NameplateSlot, VanillaPart};
    use crate::host::HostState;

    #[test]
    fn later_part_setter_overrides_group() {
        let mut host = HostState::new();
        host.set_vanilla_visible(VanillaPart::All, Some(false));
        host.set_vanilla_visible(VanillaPart::Head, Some(true));
        assert!(host.vanilla_rendered(VanillaPart::Head));
        assert!(!host.vanilla_rendered(VanillaPart::Cape));

        host.set_vanilla_visible(VanillaPart::All, Some(false));
        assert!(!host.vanilla_rendered(VanillaPart::Head));
    }

    #[test]
    fn group_reset_clears_members() {
        let mut host = HostState::new();
        host.set_vanilla_visible(VanillaPart::Outer, Some(false));
        host.set_vanilla_visible(VanillaPart::Outer, None);
        assert_eq!(host.vanilla_visible(VanillaPart::Hat), None);
        assert_eq!(host.vanilla_visible(VanillaPart::Outer), None);
    }

    #[test]
    fn slot_names_parse_case_insensitively() {
        assert_eq!(NameplateSlot::parse("entity"), Some(NameplateSlot::Entity));
        assert_eq!(VanillaPart::parse("left_arm"), Some(VanillaPart::LeftArm));
        assert_eq!(VanillaPart::parse("TAIL"), None);
    }
}
