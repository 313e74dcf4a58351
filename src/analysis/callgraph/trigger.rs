use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::script::{prototype, Prototype};

/// The mechanism through which one script causes another to run.
///
/// Most triggers carry the numeric id used in the script container; the
/// shift-op triggers are never encoded and have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum Trigger {
    OpWorldMapElement1,
    OpWorldMapElement2,
    OpWorldMapElement3,
    OpWorldMapElement4,
    OpWorldMapElement5,
    WorldMapElementMouseOver,
    WorldMapElementMouseLeave,
    WorldMapElementMouseRepeat,
    LoadNpc,
    LoadLoc,
    UpdateObjStack,
    #[strum(serialize = "trigger_47")]
    Trigger47,
    #[strum(serialize = "trigger_48")]
    Trigger48,
    #[strum(serialize = "trigger_49")]
    Trigger49,
    /// A procedure call.
    Proc,
    /// A legacy invoke or a UI event hook.
    ClientScript,
    OnClickLoc,
    OnClickObj,
    OnClickNpc,
    OnClickPlayer,
    #[strum(serialize = "trigger_82")]
    Trigger82,
    ShiftOpNpc,
    ShiftOpLoc,
    ShiftOpObj,
    ShiftOpPlayer,
    ShiftOpTile,
}

impl Trigger {
    /// Returns the encoded trigger id.
    #[must_use]
    pub const fn id(self) -> Option<i32> {
        Some(match self {
            Trigger::OpWorldMapElement1 => 10,
            Trigger::OpWorldMapElement2 => 11,
            Trigger::OpWorldMapElement3 => 12,
            Trigger::OpWorldMapElement4 => 13,
            Trigger::OpWorldMapElement5 => 14,
            Trigger::WorldMapElementMouseOver => 15,
            Trigger::WorldMapElementMouseLeave => 16,
            Trigger::WorldMapElementMouseRepeat => 17,
            Trigger::LoadNpc => 35,
            Trigger::LoadLoc => 37,
            Trigger::UpdateObjStack => 45,
            Trigger::Trigger47 => 47,
            Trigger::Trigger48 => 48,
            Trigger::Trigger49 => 49,
            Trigger::Proc => 73,
            Trigger::ClientScript => 76,
            Trigger::OnClickLoc => 78,
            Trigger::OnClickObj => 79,
            Trigger::OnClickNpc => 80,
            Trigger::OnClickPlayer => 81,
            Trigger::Trigger82 => 82,
            Trigger::ShiftOpNpc
            | Trigger::ShiftOpLoc
            | Trigger::ShiftOpObj
            | Trigger::ShiftOpPlayer
            | Trigger::ShiftOpTile => return None,
        })
    }

    /// Decodes an encoded trigger id.
    #[must_use]
    pub fn from_id(id: i32) -> Option<Trigger> {
        Trigger::iter().find(|t| t.id() == Some(id))
    }

    /// Returns the type of the entity a triggered script is about, if any.
    #[must_use]
    pub const fn subject(self) -> Option<Prototype> {
        match self {
            Trigger::OpWorldMapElement1
            | Trigger::OpWorldMapElement2
            | Trigger::OpWorldMapElement3
            | Trigger::OpWorldMapElement4
            | Trigger::OpWorldMapElement5
            | Trigger::WorldMapElementMouseOver
            | Trigger::WorldMapElementMouseLeave
            | Trigger::WorldMapElementMouseRepeat => Some(prototype::MAPELEMENT),
            Trigger::LoadNpc => Some(prototype::NPC),
            Trigger::LoadLoc => Some(prototype::LOC),
            _ => None,
        }
    }
}
