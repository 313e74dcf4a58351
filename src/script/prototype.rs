//! Prototypes: named uses of a [`Type`].
//!
//! A prototype pairs a concrete type with the identifier a decompiled variable of
//! that role should be named after. `x`, `width` and `colour` are all plain
//! integers, but naming them apart makes the output readable. Command table
//! signatures are written in prototypes.

use std::fmt;

use crate::script::{StackType, Type};

/// A type together with an optional role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prototype {
    /// The concrete type
    pub ty: Type,
    /// Role name, if it differs from the type literal
    pub identifier: Option<&'static str>,
}

impl Prototype {
    /// Prototype named after its type.
    #[must_use]
    pub const fn of(ty: Type) -> Self {
        Prototype {
            ty,
            identifier: None,
        }
    }

    /// Prototype with a role identifier.
    #[must_use]
    pub const fn named(ty: Type, identifier: &'static str) -> Self {
        Prototype {
            ty,
            identifier: Some(identifier),
        }
    }

    /// Returns the identifier, falling back to the type literal.
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        self.identifier.unwrap_or_else(|| self.ty.literal())
    }

    /// Returns the stack values of this prototype live on.
    #[must_use]
    pub const fn stack_type(&self) -> StackType {
        self.ty.stack_type()
    }
}

impl From<Type> for Prototype {
    fn from(ty: Type) -> Self {
        Prototype::of(ty)
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identifier {
            Some(id) => write!(f, "{}<{id}>", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

macro_rules! prototypes {
    ($($(#[$meta:meta])* $name:ident = $ty:ident $(as $id:literal)?;)*) => {
        $(
            $(#[$meta])*
            #[allow(missing_docs)]
            pub const $name: Prototype = prototypes!(@make $ty $(, $id)?);
        )*
    };
    (@make $ty:ident) => { Prototype::of(Type::$ty) };
    (@make $ty:ident, $id:literal) => { Prototype::named(Type::$ty, $id) };
}

prototypes! {
    INT = Int;
    BOOLEAN = Boolean;
    STRING = String;
    CHAR = Char;
    COMPONENT = Component;
    COORD = Coord;
    CATEGORY = Category;
    CURSOR = Cursor;
    DBROW = Dbrow;
    DBCOLUMN = Dbcolumn;
    ENUM = Enum;
    FONTMETRICS = Fontmetrics;
    GRAPHIC = Graphic;
    IDKIT = Idkit;
    INTERFACE = Interface;
    INV = Inv;
    LOC = Loc;
    MAPAREA = Maparea;
    MAPELEMENT = Mapelement;
    MODEL = Model;
    NAMEDOBJ = Namedobj;
    NPC = Npc;
    OBJ = Obj;
    PARAM = Param;
    SEQ = Seq;
    STAT = Stat;
    STRUCT = Struct;
    SYNTH = Synth;
    /// The type tag operand of enum lookups.
    TYPE = Type;

    X = Int as "x";
    Y = Int as "y";
    WIDTH = Int as "width";
    HEIGHT = Int as "height";
    COLOUR = Int as "colour";
    TRANS = Int as "trans";
    ANGLE = Int as "angle";
    INDEX = Int as "index";
    LENGTH = Int as "length";
    COUNT = Int as "count";
    NUM = Int as "num";
    FLAGS = Int as "flags";
    CLOCK = Int as "clock";
    LEVEL = Int as "level";
    XP = Int as "xp";
    OPINDEX = Int as "opindex";
    COMSUBID = Int as "comsubid";
    IFTYPE = Int as "iftype";
    SETPOSH = Int as "setposh";
    SETPOSV = Int as "setposv";
    SETSIZE = Int as "setsize";
    SETTEXTALIGNH = Int as "settextalignh";
    SETTEXTALIGNV = Int as "settextalignv";
    KEY = Int as "key";
    MOUSE_X = Int as "mousex";
    MOUSE_Y = Int as "mousey";
    DROP_COMPONENT = Component as "drop";
    EVENT_COMPONENT = Component as "event_com";
    TEXT = String as "text";
    OP = String as "op";
    OPBASE = String as "opbase";
    USERNAME = String as "username";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_fallback() {
        assert_eq!(OBJ.identifier(), "obj");
        assert_eq!(WIDTH.identifier(), "width");
        assert_eq!(MAPAREA.identifier(), "wma");
    }

    #[test]
    fn test_prototype_stack_types() {
        assert_eq!(TEXT.stack_type(), StackType::String);
        assert_eq!(COLOUR.stack_type(), StackType::Int);
        assert_eq!(Prototype::from(Type::Obj), OBJ);
    }

    #[test]
    fn test_display() {
        assert_eq!(OBJ.to_string(), "obj");
        assert_eq!(X.to_string(), "int<x>");
    }
}
