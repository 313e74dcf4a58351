//! Script value types.
//!
//! Every value a script handles lives on one of two VM stacks ([`StackType`]), but
//! carries a more precise [`Type`]. Types are encoded in bytecode as one-byte
//! descriptors (CP-1252 characters), for instance in the output-type tag of an
//! enum lookup or in the argument descriptor of an event hook.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The VM stack a value lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum StackType {
    /// The integer stack.
    Int,
    /// The string stack.
    String,
}

impl StackType {
    /// Returns the type an unconstrained value on this stack prints as.
    #[must_use]
    pub const fn default_type(self) -> Type {
        match self {
            StackType::Int => Type::Int,
            StackType::String => Type::String,
        }
    }
}

/// A concrete script type.
///
/// The `Display` form is the literal used in decompiled source (`obj`, `wma`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum Type {
    Area,
    Boolean,
    Category,
    Char,
    Chatcat,
    Chatphrase,
    Component,
    Cursor,
    Coord,
    Dbrow,
    Enum,
    Fontmetrics,
    Graphic,
    Idkit,
    Int,
    Interface,
    Inv,
    Stringvector,
    Loc,
    Locshape,
    #[strum(serialize = "wma")]
    Maparea,
    Mapelement,
    Midi,
    Model,
    Namedobj,
    Entityoverlay,
    Npc,
    #[strum(serialize = "npc_uid")]
    NpcUid,
    Obj,
    Overlayinterface,
    Param,
    #[strum(serialize = "player_uid")]
    PlayerUid,
    Seq,
    Spotanim,
    Stat,
    String,
    Struct,
    Synth,
    Toplevelinterface,
    Type,
    Dbtable,
    Dbcolumn,
}

impl Type {
    /// Returns the one-character bytecode descriptor, if this type has one.
    #[must_use]
    pub const fn desc(self) -> Option<char> {
        Some(match self {
            Type::Area => 'R',
            Type::Boolean => '1',
            Type::Category => 'y',
            Type::Char => 'z',
            Type::Chatcat => 'k',
            Type::Chatphrase => 'e',
            Type::Component => 'I',
            Type::Cursor => '@',
            Type::Coord => 'c',
            Type::Dbrow => 'Ð',
            Type::Enum => 'g',
            Type::Fontmetrics => 'f',
            Type::Graphic => 'd',
            Type::Idkit => 'K',
            Type::Int => 'i',
            Type::Interface => 'a',
            Type::Inv => 'v',
            Type::Stringvector => '¸',
            Type::Loc => 'l',
            Type::Locshape => 'H',
            Type::Maparea => '`',
            Type::Mapelement => 'µ',
            Type::Midi => 'M',
            Type::Model => 'm',
            Type::Namedobj => 'O',
            Type::Entityoverlay => '-',
            Type::Npc => 'n',
            Type::NpcUid => 'u',
            Type::Obj => 'o',
            Type::Overlayinterface => 'L',
            Type::PlayerUid => 'p',
            Type::Seq => 'A',
            Type::Spotanim => 't',
            Type::Stat => 'S',
            Type::String => 's',
            Type::Struct => 'J',
            Type::Synth => 'P',
            Type::Toplevelinterface => 'F',
            Type::Param | Type::Type | Type::Dbtable | Type::Dbcolumn => return None,
        })
    }

    /// Decodes a descriptor character.
    #[must_use]
    pub fn from_desc(desc: char) -> Option<Type> {
        use strum::IntoEnumIterator;

        Type::iter().find(|ty| ty.desc() == Some(desc))
    }

    /// Decodes a descriptor byte. Descriptor bytes are CP-1252, which agrees with
    /// Latin-1 for every descriptor in use.
    #[must_use]
    pub fn from_desc_byte(desc: u8) -> Option<Type> {
        Type::from_desc(char::from(desc))
    }

    /// Returns the stack this type's values live on.
    #[must_use]
    pub const fn stack_type(self) -> StackType {
        match self {
            Type::String => StackType::String,
            _ => StackType::Int,
        }
    }

    /// Returns the source literal of this type.
    #[must_use]
    pub fn literal(self) -> &'static str {
        self.into()
    }

    /// Loosest common supertype of two distinct compatible types.
    ///
    /// Only `{obj, namedobj}` and `{fontmetrics, graphic}` are compatible.
    #[must_use]
    pub fn union(a: Type, b: Type) -> Option<Type> {
        if a == b {
            return Some(a);
        }
        match (a.min(b), a.max(b)) {
            (Type::Namedobj, Type::Obj) => Some(Type::Obj),
            (Type::Fontmetrics, Type::Graphic) => Some(Type::Fontmetrics),
            _ => None,
        }
    }

    /// Tightest common subtype of two distinct compatible types.
    #[must_use]
    pub fn intersection(a: Type, b: Type) -> Option<Type> {
        if a == b {
            return Some(a);
        }
        match (a.min(b), a.max(b)) {
            (Type::Namedobj, Type::Obj) => Some(Type::Namedobj),
            (Type::Fontmetrics, Type::Graphic) => Some(Type::Graphic),
            _ => None,
        }
    }
}
