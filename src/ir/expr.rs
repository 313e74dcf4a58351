use std::fmt;

use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{
    interpreter::opcodes::{SS_AND, SS_OR},
    ir::{TypingId, Variable},
    script::{StackType, Type, Value},
};

/// Magic constants a hook argument list uses to forward event data.
///
/// At runtime the client substitutes the current event's value; statically they
/// are plain constants that are recognised by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum EventProperty {
    #[strum(serialize = "event_mousex")]
    MouseX,
    #[strum(serialize = "event_mousey")]
    MouseY,
    #[strum(serialize = "event_com")]
    Com,
    #[strum(serialize = "event_opindex")]
    OpIndex,
    #[strum(serialize = "event_comsubid")]
    ComSubId,
    #[strum(serialize = "event_drop")]
    Drop,
    #[strum(serialize = "event_dropsubid")]
    DropSubId,
    #[strum(serialize = "event_keycode")]
    KeyCode,
    #[strum(serialize = "event_keychar")]
    KeyChar,
    #[strum(serialize = "event_opbase")]
    OpBase,
}

impl EventProperty {
    /// Returns the constant that stands for this property in bytecode.
    #[must_use]
    pub fn value(self) -> Value {
        match self {
            EventProperty::MouseX => Value::Int(i32::MIN + 1),
            EventProperty::MouseY => Value::Int(i32::MIN + 2),
            EventProperty::Com => Value::Int(i32::MIN + 3),
            EventProperty::OpIndex => Value::Int(i32::MIN + 4),
            EventProperty::ComSubId => Value::Int(i32::MIN + 5),
            EventProperty::Drop => Value::Int(i32::MIN + 6),
            EventProperty::DropSubId => Value::Int(i32::MIN + 7),
            EventProperty::KeyCode => Value::Int(i32::MIN + 8),
            EventProperty::KeyChar => Value::Int(i32::MIN + 9),
            EventProperty::OpBase => Value::Str("event_opbase".to_string()),
        }
    }

    /// Returns the type of the forwarded value.
    #[must_use]
    pub const fn ty(self) -> Type {
        match self {
            EventProperty::Com | EventProperty::Drop => Type::Component,
            EventProperty::KeyChar => Type::Char,
            EventProperty::OpBase => Type::String,
            _ => Type::Int,
        }
    }

    /// Recognises a constant as an event property.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<EventProperty> {
        EventProperty::iter().find(|p| p.value() == *value)
    }

    /// Returns the source literal.
    #[must_use]
    pub fn literal(self) -> &'static str {
        self.into()
    }
}

/// An IR expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A reference to a variable.
    Var {
        /// The referenced location
        variable: Variable,
        /// Typing of the reference
        typing: TypingId,
    },
    /// A literal.
    Cst {
        /// The literal value
        value: Value,
        /// Typing of the literal
        typing: TypingId,
    },
    /// A command with results on the stack.
    Operation {
        /// Opcode of the command
        opcode: u16,
        /// Arguments in push order
        arguments: Vec<Expr>,
        /// Result stack types in push order
        results: Vec<StackType>,
        /// One typing per result
        typings: Vec<TypingId>,
        /// Component-relative addressing
        dot: bool,
    },
    /// A procedure call or legacy invoke.
    Call {
        /// Opcode of the call
        opcode: u16,
        /// Callee script id
        script: i32,
        /// Arguments in push order
        arguments: Vec<Expr>,
        /// Result stack types in push order
        results: Vec<StackType>,
        /// One typing per result
        typings: Vec<TypingId>,
    },
    /// Registration of a script as a UI event handler.
    Hook {
        /// Opcode of the hook setter
        opcode: u16,
        /// Handler script id, `-1` to clear the hook
        script: i32,
        /// Handler arguments in push order
        arguments: Vec<Expr>,
        /// Transmit triggers that fire the handler
        triggers: Vec<Expr>,
        /// Component-relative addressing
        dot: bool,
        /// Target component, for interface-level setters
        component: Option<Box<Expr>>,
    },
    /// A transmit trigger naming a variable.
    Pointer(Variable),
    /// A forwarded event value.
    EventProperty(EventProperty),
}

impl Expr {
    /// Returns the typings of the values this expression produces.
    #[must_use]
    pub fn typings(&self) -> Vec<TypingId> {
        match self {
            Expr::Var { typing, .. } | Expr::Cst { typing, .. } => vec![*typing],
            Expr::Operation { typings, .. } | Expr::Call { typings, .. } => typings.clone(),
            Expr::Hook { .. } | Expr::Pointer(_) | Expr::EventProperty(_) => Vec::new(),
        }
    }

    /// Returns the stack types of the values this expression produces.
    #[must_use]
    pub fn stack_types(&self) -> Vec<StackType> {
        match self {
            Expr::Var { variable, .. } => vec![variable.stack_type()],
            Expr::Cst { value, .. } => vec![value.stack_type()],
            Expr::Operation { results, .. } | Expr::Call { results, .. } => results.clone(),
            Expr::EventProperty(p) => vec![p.ty().stack_type()],
            Expr::Hook { .. } | Expr::Pointer(_) => Vec::new(),
        }
    }

    /// Returns the constant payload of a literal.
    #[must_use]
    pub fn constant(&self) -> Option<&Value> {
        match self {
            Expr::Cst { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the referenced variable.
    #[must_use]
    pub fn variable(&self) -> Option<Variable> {
        match self {
            Expr::Var { variable, .. } | Expr::Pointer(variable) => Some(*variable),
            _ => None,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var { variable, .. } => write!(f, "{variable}"),
            Expr::Cst { value, .. } => write!(f, "{value}"),
            Expr::Operation {
                opcode: opcode @ (SS_AND | SS_OR),
                arguments,
                ..
            } => {
                let joiner = if *opcode == SS_AND { " && " } else { " || " };
                f.write_str("(")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(")")
            }
            Expr::Operation {
                opcode,
                arguments,
                dot,
                ..
            } => {
                if *dot {
                    f.write_str(".")?;
                }
                write!(f, "op{opcode}(")?;
                write_list(f, arguments)?;
                f.write_str(")")
            }
            Expr::Call {
                script, arguments, ..
            } => {
                write!(f, "~script{script}(")?;
                write_list(f, arguments)?;
                f.write_str(")")
            }
            Expr::Hook {
                opcode,
                script,
                arguments,
                triggers,
                dot,
                component,
            } => {
                if *dot {
                    f.write_str(".")?;
                }
                write!(f, "op{opcode}(script{script}(")?;
                write_list(f, arguments)?;
                f.write_str(")")?;
                if !triggers.is_empty() {
                    f.write_str("{")?;
                    write_list(f, triggers)?;
                    f.write_str("}")?;
                }
                if let Some(component) = component {
                    write!(f, ", {component}")?;
                }
                f.write_str(")")
            }
            Expr::Pointer(variable) => write!(f, "{variable}"),
            Expr::EventProperty(p) => f.write_str(p.literal()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_property_recognition() {
        assert_eq!(
            EventProperty::from_value(&Value::Int(i32::MIN + 1)),
            Some(EventProperty::MouseX)
        );
        assert_eq!(
            EventProperty::from_value(&Value::from("event_opbase")),
            Some(EventProperty::OpBase)
        );
        assert_eq!(EventProperty::from_value(&Value::Int(5)), None);
        assert_eq!(EventProperty::Drop.literal(), "event_drop");
        assert_eq!(EventProperty::KeyChar.ty(), Type::Char);
    }

    #[test]
    fn test_expression_shapes() {
        let op = Expr::Operation {
            opcode: 4000,
            arguments: vec![Expr::EventProperty(EventProperty::MouseX)],
            results: vec![StackType::Int],
            typings: vec![],
            dot: false,
        };
        assert_eq!(op.stack_types(), vec![StackType::Int]);
        assert_eq!(op.to_string(), "op4000(event_mousex)");

        let both = Expr::Operation {
            opcode: SS_AND,
            arguments: vec![op.clone(), Expr::EventProperty(EventProperty::MouseY)],
            results: Vec::new(),
            typings: Vec::new(),
            dot: false,
        };
        assert_eq!(both.to_string(), "(op4000(event_mousex) && event_mousey)");
        assert!(Expr::Pointer(Variable::Varp(3)).typings().is_empty());
    }
}
