//! Per-script interpretation state.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    ir::{Expr, Label, TypingId, Typings, Variable},
    script::{Script, StackType, Value},
    Error, Result,
};

/// One abstract stack slot.
///
/// Slots stand for values, they never hold them. A slot pushed by a constant
/// also remembers the constant, so that rules reading a type tag or a param id
/// from the stack can peek it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub variable: Variable,
    pub typing: TypingId,
    pub value: Option<Value>,
}

impl Element {
    pub fn stack_type(&self) -> StackType {
        self.variable.stack_type()
    }

    /// Returns the reference expression of the slot.
    pub fn expr(&self) -> Expr {
        Expr::Var {
            variable: self.variable,
            typing: self.typing,
        }
    }
}

/// Program counter and abstract operand stack of the script being interpreted.
#[derive(Debug)]
pub(crate) struct Frame {
    pub id: i32,
    pub script: Arc<Script>,
    pub pc: usize,
    stack: Vec<Element>,
    counter: u32,
}

impl Frame {
    pub fn new(id: i32, script: Arc<Script>) -> Self {
        Frame {
            id,
            script,
            pc: 0,
            stack: Vec::new(),
            counter: 0,
        }
    }

    pub fn imbalance(&self, message: impl Into<String>) -> Error {
        Error::StackImbalance {
            script: self.id,
            pc: self.pc,
            message: message.into(),
        }
    }

    pub fn opcode(&self) -> Result<u16> {
        self.script
            .opcodes
            .get(self.pc)
            .copied()
            .ok_or_else(|| malformed_error!("Script {} has no opcode at pc {}", self.id, self.pc))
    }

    pub fn operand(&self) -> Result<&Value> {
        self.script
            .operands
            .get(self.pc)
            .ok_or_else(|| malformed_error!("Script {} has no operand at pc {}", self.id, self.pc))
    }

    pub fn int_operand(&self) -> Result<i32> {
        let operand = self.operand()?;
        operand.as_int().ok_or_else(|| {
            malformed_error!(
                "Script {} pc {}: expected an integer operand, found {}",
                self.id,
                self.pc,
                operand
            )
        })
    }

    /// Returns the label `offset + 1` instructions after the current one.
    pub fn jump(&self, offset: i32) -> Result<Label> {
        let target = self.pc as i64 + i64::from(offset) + 1;
        if target < 0 || target >= self.script.len() as i64 {
            return Err(malformed_error!(
                "Script {} pc {}: jump target {} is outside the script",
                self.id,
                self.pc,
                target
            ));
        }
        Ok(Label(target as usize))
    }

    /// Returns the switch table selected by the operand.
    pub fn switch_table(&self) -> Result<&BTreeMap<i32, i32>> {
        let index = self.int_operand()?;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.script.switches.get(i))
            .ok_or_else(|| {
                malformed_error!(
                    "Script {} pc {}: no switch table {}",
                    self.id,
                    self.pc,
                    index
                )
            })
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Pushes a fresh stack slot.
    pub fn push(
        &mut self,
        typings: &mut Typings,
        stack_type: StackType,
        value: Option<Value>,
    ) -> Result<Element> {
        if let Some(v) = &value {
            if v.stack_type() != stack_type {
                return Err(self.imbalance(format!("cannot push {v} as {stack_type}")));
            }
        }
        let variable = Variable::Stack {
            script: self.id,
            id: self.counter,
            stack_type,
        };
        self.counter += 1;
        let element = Element {
            variable,
            typing: typings.of_variable(variable),
            value,
        };
        self.stack.push(element.clone());
        Ok(element)
    }

    /// Pushes one slot per stack type, in order.
    pub fn push_all(
        &mut self,
        typings: &mut Typings,
        stack_types: &[StackType],
    ) -> Result<Vec<Element>> {
        stack_types
            .iter()
            .map(|&stack_type| self.push(typings, stack_type, None))
            .collect()
    }

    /// Pops the top slot, which must live on `stack_type`.
    pub fn pop(&mut self, stack_type: StackType) -> Result<Element> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| self.imbalance(format!("pop of {stack_type} from an empty stack")))?;
        if element.stack_type() != stack_type {
            return Err(self.imbalance(format!(
                "expected {stack_type}, found {} {}",
                element.stack_type(),
                element.variable
            )));
        }
        Ok(element)
    }

    /// Pops the top `count` slots of any stack type, returned in push order.
    pub fn pop_count(&mut self, count: usize) -> Result<Vec<Element>> {
        if count > self.stack.len() {
            return Err(self.imbalance(format!(
                "pop of {count} values from a stack of {}",
                self.stack.len()
            )));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    /// Pops slots matching `stack_types`, top of stack last; returned in push order.
    pub fn pop_types(&mut self, stack_types: &[StackType]) -> Result<Vec<Element>> {
        let mut popped = Vec::with_capacity(stack_types.len());
        for &stack_type in stack_types.iter().rev() {
            popped.push(self.pop(stack_type)?);
        }
        popped.reverse();
        Ok(popped)
    }

    /// Empties the stack, returning the slots in push order.
    pub fn pop_all(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.stack)
    }

    /// Returns the constant remembered by the slot `depth` positions below the top.
    pub fn peek_value_at(&self, depth: usize) -> Option<&Value> {
        let index = self.stack.len().checked_sub(depth + 1)?;
        self.stack[index].value.as_ref()
    }

    pub fn peek_value(&self) -> Option<&Value> {
        self.peek_value_at(0)
    }

    /// Pops the top slot, which must have been pushed as a constant.
    pub fn pop_value(&mut self, stack_type: StackType) -> Result<Value> {
        let element = self.pop(stack_type)?;
        element.value.ok_or_else(|| {
            malformed_error!(
                "Script {} pc {}: {} is not a constant",
                self.id,
                self.pc,
                element.variable
            )
        })
    }

    /// Pops an integer constant.
    pub fn pop_int(&mut self) -> Result<i32> {
        let value = self.pop_value(StackType::Int)?;
        value
            .as_int()
            .ok_or_else(|| malformed_error!("Script {}: {} is not an integer", self.id, value))
    }

    /// Peeks an integer constant without popping it.
    pub fn peek_int_at(&self, depth: usize) -> Result<i32> {
        self.peek_value_at(depth)
            .and_then(Value::as_int)
            .ok_or_else(|| {
                malformed_error!(
                    "Script {} pc {}: stack value {} below the top is not an integer constant",
                    self.id,
                    self.pc,
                    depth
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(len: usize) -> Frame {
        let script = Script::new(vec![0; len], vec![Value::Int(0); len], 0, 0, vec![]);
        Frame::new(7, Arc::new(script))
    }

    #[test]
    fn test_opcode_past_the_end_is_malformed() {
        let mut frame = frame(2);
        frame.pc = 1;
        assert_eq!(frame.opcode().unwrap(), 0);

        frame.pc = 2;
        assert!(matches!(frame.opcode(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_push_numbers_slots_sequentially() {
        let mut typings = Typings::new();
        let mut frame = frame(1);
        let a = frame.push(&mut typings, StackType::Int, None).unwrap();
        let b = frame.push(&mut typings, StackType::String, None).unwrap();

        assert_eq!(a.variable.to_string(), "stack0");
        assert_eq!(b.variable.to_string(), "stack1");
        assert_eq!(frame.depth(), 2);
    }

    #[test]
    fn test_pop_checks_stack_type() {
        let mut typings = Typings::new();
        let mut frame = frame(1);
        frame.push(&mut typings, StackType::String, None).unwrap();

        let err = frame.pop(StackType::Int).unwrap_err();
        assert!(matches!(err, Error::StackImbalance { script: 7, .. }));
        assert!(frame.pop(StackType::Int).is_err());
    }

    #[test]
    fn test_pop_count_keeps_push_order() {
        let mut typings = Typings::new();
        let mut frame = frame(1);
        for i in 0..3 {
            frame
                .push(&mut typings, StackType::Int, Some(Value::Int(i)))
                .unwrap();
        }

        assert_eq!(frame.peek_value(), Some(&Value::Int(2)));
        assert_eq!(frame.peek_int_at(2).unwrap(), 0);

        let popped = frame.pop_count(2).unwrap();
        assert_eq!(popped[0].value, Some(Value::Int(1)));
        assert_eq!(popped[1].value, Some(Value::Int(2)));
        assert!(frame.pop_count(2).is_err());
    }

    #[test]
    fn test_jump_bounds() {
        let frame = frame(4);
        assert_eq!(frame.jump(2).unwrap(), Label(3));
        assert_eq!(frame.jump(-1).unwrap(), Label(0));
        assert!(frame.jump(3).is_err());
        assert!(frame.jump(-2).is_err());
    }
}
