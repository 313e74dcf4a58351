//! Region-based structuring over the block graph.
//!
//! A *region* starts at a block and follows control until it reaches the
//! innermost stop block (the merge point of the enclosing construct) or the
//! innermost loop header. Each block contributes one piece:
//!
//! | Block | Piece | Region continues at |
//! |-------|-------|---------------------|
//! | loop header | `While` | the loop exit |
//! | branch | `If`, preceded by the block's statements | the merge point |
//! | switch | `Switch`, preceded by the block's statements | the merge point |
//! | anything else | `Seq` | the successor |
//!
//! Merge points are immediate post-dominators. Goto-only blocks are looked
//! through everywhere, so they never appear as pieces. The pieces of a region
//! are chained through their `next` links.
//!
//! Before a branch is structured, branch-only blocks that share one of its
//! targets are folded into it: `if (a) goto T; if (b) goto T` becomes one test
//! of `a || b`, and a branch whose taken side tests again with the same
//! fallthrough becomes `a && b`. A switch whose arms only meet after some of
//! them return continues at the nearest block that most arms reach.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{trace, warn};

use crate::{
    analysis::{
        cfg::{BasicBlock, BlockExit, ControlFlowGraph},
        structure::{Condition, Construct},
    },
    interpreter::opcodes::{SS_AND, SS_OR},
    ir::{Expr, Function, Instruction},
    utils::graph::{algorithms, NodeId},
    Error, Result,
};

/// Structures the control flow of a function into a [`Construct`] tree.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the block graph cannot be built and
/// [`Error::StructuringFailure`] if the graph is not expressible with
/// sequences, ifs, while loops and switches.
pub fn reconstruct(function: &Function) -> Result<Construct> {
    let cfg = ControlFlowGraph::build(function)?;
    let mut structurer = Structurer {
        cfg: &cfg,
        visited: vec![false; cfg.block_count()],
    };

    let root = structurer.region(cfg.entry(), Scope::default())?;
    structurer.check_placement()?;

    trace!(
        "Structured script {} from {} blocks",
        function.id,
        cfg.block_count()
    );
    Ok(root.unwrap_or_else(Construct::empty))
}

/// Where the region being built must end.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    stop: Option<NodeId>,
    header: Option<NodeId>,
}

impl Scope {
    fn ends_at(self, node: NodeId) -> bool {
        Some(node) == self.stop || Some(node) == self.header
    }

    fn until(self, stop: Option<NodeId>) -> Scope {
        Scope {
            stop,
            header: self.header,
        }
    }
}

/// Pieces produced by one block, and the block the region continues with.
type Step = (Vec<Construct>, Option<NodeId>);

/// A conditional exit after short-circuit folding.
struct Test {
    /// Statements of the folded blocks, in program order
    prelude: Vec<Instruction>,
    expression: Expr,
    taken: NodeId,
    fallthrough: NodeId,
}

/// A branch block that extends a test.
struct Fold {
    block: NodeId,
    opcode: u16,
    taken: NodeId,
    fallthrough: NodeId,
}

struct Structurer<'c, 'f> {
    cfg: &'c ControlFlowGraph<'f>,
    visited: Vec<bool>,
}

impl Structurer<'_, '_> {
    fn failure(&self, message: String) -> Error {
        Error::StructuringFailure {
            script: self.cfg.function().id,
            message,
        }
    }

    fn block(&self, node: NodeId) -> Result<&BasicBlock> {
        self.cfg
            .block(node)
            .ok_or_else(|| self.failure(format!("unknown block {node}")))
    }

    fn region(&mut self, start: NodeId, scope: Scope) -> Result<Option<Construct>> {
        let mut pieces = Vec::new();
        let mut current = Some(start);

        while let Some(node) = current {
            let node = self.cfg.forward(node);
            if scope.ends_at(node) {
                break;
            }
            match self.visited.get_mut(node.index()) {
                Some(seen) if !*seen => *seen = true,
                _ => {
                    return Err(self.failure(format!(
                        "block B{} is reached outside its enclosing construct",
                        node.index()
                    )))
                }
            }

            let (mut produced, follow) = self.structure(node, scope)?;
            pieces.append(&mut produced);
            current = follow;
        }

        Ok(chain(pieces))
    }

    fn structure(&mut self, node: NodeId, scope: Scope) -> Result<Step> {
        let block = self.block(node)?;
        let statements = self.statements(block);

        if self.cfg.is_loop_header(node) {
            return self.looping(node, statements);
        }

        match block.exit.clone() {
            BlockExit::Branch { taken, fallthrough } => {
                self.conditional(node, statements, taken, fallthrough, scope)
            }
            BlockExit::Switch { cases, default } => {
                self.switch(node, statements, &cases, default, scope)
            }
            BlockExit::Goto(next) | BlockExit::Fallthrough(Some(next)) => {
                Ok((sequence(statements), Some(next)))
            }
            BlockExit::Return | BlockExit::Fallthrough(None) => Ok((sequence(statements), None)),
        }
    }

    fn statements(&self, block: &BasicBlock) -> Vec<Instruction> {
        block
            .body
            .iter()
            .filter_map(|&id| self.cfg.instruction(id))
            .cloned()
            .collect()
    }

    fn terminator(&self, node: NodeId) -> Result<&Instruction> {
        let block = self.block(node)?;
        block
            .terminator
            .and_then(|id| self.cfg.instruction(id))
            .ok_or_else(|| self.failure(format!("block B{} has no terminator", node.index())))
    }

    fn branch_condition(&self, node: NodeId) -> Result<Expr> {
        match self.terminator(node)? {
            Instruction::Branch { condition, .. } => Ok(condition.clone()),
            other => Err(self.failure(format!("expected a branch, found `{other}`"))),
        }
    }

    /// Returns `true` if control can flow from `from` to `to` inside the scope.
    fn reaches(&self, from: NodeId, to: NodeId, scope: Scope) -> bool {
        let marked = algorithms::reachable(self.cfg, from, |n| scope.ends_at(n));
        marked.get(to.index()).copied().unwrap_or(false)
    }

    /// Returns `true` if control from `from` can leave the scope.
    fn escapes(&self, from: NodeId, scope: Scope) -> bool {
        [scope.stop, scope.header]
            .into_iter()
            .flatten()
            .any(|end| self.reaches(from, end, scope))
    }

    /// Builds the test of a branch block, folding in the branch-only blocks
    /// that continue it.
    fn test(
        &mut self,
        node: NodeId,
        taken: NodeId,
        fallthrough: NodeId,
        scope: Scope,
    ) -> Result<Test> {
        let mut test = Test {
            prelude: Vec::new(),
            expression: self.branch_condition(node)?,
            taken: self.cfg.forward(taken),
            fallthrough: self.cfg.forward(fallthrough),
        };
        let mut chain = vec![node];
        while let Some(fold) = self.fold(&chain, &test, scope)? {
            let block = self.block(fold.block)?;
            test.prelude.extend(self.statements(block));
            test.expression = Expr::Operation {
                opcode: fold.opcode,
                arguments: vec![test.expression, self.branch_condition(fold.block)?],
                results: Vec::new(),
                typings: Vec::new(),
                dot: false,
            };
            test.taken = fold.taken;
            test.fallthrough = fold.fallthrough;
            if let Some(seen) = self.visited.get_mut(fold.block.index()) {
                *seen = true;
            }
            chain.push(fold.block);
        }
        if chain.len() > 1 {
            trace!(
                "Folded {} branches at block B{} into one condition",
                chain.len(),
                node.index()
            );
        }
        Ok(test)
    }

    /// Finds a branch block that extends `test` and is entered only from the
    /// blocks already folded. Its statements may only copy values.
    fn fold(&self, chain: &[NodeId], test: &Test, scope: Scope) -> Result<Option<Fold>> {
        for (candidate, opcode) in [(test.fallthrough, SS_OR), (test.taken, SS_AND)] {
            let block = self.block(candidate)?;
            let BlockExit::Branch { taken, fallthrough } = block.exit else {
                continue;
            };
            let placed = self.visited.get(candidate.index()).copied().unwrap_or(true);
            let copies_only = block
                .body
                .iter()
                .filter_map(|&id| self.cfg.instruction(id))
                .all(is_copy);
            if placed
                || !copies_only
                || chain.contains(&candidate)
                || scope.ends_at(candidate)
                || self.cfg.is_loop_header(candidate)
                || !self.cfg.predecessors(candidate).all(|p| chain.contains(&p))
            {
                continue;
            }

            let taken = self.cfg.forward(taken);
            let fallthrough = self.cfg.forward(fallthrough);
            let fold = match opcode {
                SS_OR if taken == test.taken => Fold {
                    block: candidate,
                    opcode,
                    taken,
                    fallthrough,
                },
                SS_AND if fallthrough == test.fallthrough => Fold {
                    block: candidate,
                    opcode,
                    taken,
                    fallthrough,
                },
                _ => continue,
            };
            return Ok(Some(fold));
        }
        Ok(None)
    }

    fn merge_point(&self, node: NodeId) -> Option<NodeId> {
        self.cfg
            .immediate_post_dominator(node)
            .map(|m| self.cfg.forward(m))
    }

    fn arm(&mut self, start: NodeId, scope: Scope) -> Result<Construct> {
        Ok(self.region(start, scope)?.unwrap_or_else(Construct::empty))
    }

    fn looping(&mut self, header: NodeId, statements: Vec<Instruction>) -> Result<Step> {
        let BlockExit::Branch { taken, fallthrough } = self.block(header)?.exit else {
            return Err(self.failure(format!(
                "loop at block B{} does not start with a conditional exit",
                header.index()
            )));
        };

        let latches = self.cfg.latches(header);
        let in_loop = algorithms::natural_loop(self.cfg, header, &latches);
        let contains = |n: NodeId| in_loop.get(n.index()).copied().unwrap_or(false);

        let Test {
            prelude,
            expression,
            taken,
            fallthrough,
        } = self.test(header, taken, fallthrough, Scope::default())?;
        let (inside, outside, negated) = match (contains(taken), contains(fallthrough)) {
            (true, false) => (taken, fallthrough, false),
            (false, true) => (fallthrough, taken, true),
            _ => {
                return Err(self.failure(format!(
                    "loop at block B{} has no single exit",
                    header.index()
                )))
            }
        };

        let mut statements = statements;
        statements.extend(prelude);
        let condition = Condition {
            prelude: statements,
            expression,
            negated,
        };
        let body = self.arm(
            inside,
            Scope {
                stop: Some(header),
                header: Some(header),
            },
        )?;

        Ok((
            vec![Construct::While {
                condition,
                body: Box::new(body),
                next: None,
            }],
            Some(outside),
        ))
    }

    fn conditional(
        &mut self,
        node: NodeId,
        statements: Vec<Instruction>,
        taken: NodeId,
        fallthrough: NodeId,
        scope: Scope,
    ) -> Result<Step> {
        let Test {
            prelude,
            expression,
            taken,
            fallthrough,
        } = self.test(node, taken, fallthrough, scope)?;
        let (first, second) = if taken <= fallthrough {
            (taken, fallthrough)
        } else {
            (fallthrough, taken)
        };

        let mut branches = Vec::with_capacity(1);
        let mut otherwise = None;
        let follow;

        match self.merge_point(node) {
            // One-armed: the merge point is one of the targets.
            Some(merge) if merge == fallthrough || merge == taken => {
                let arm_start = if merge == fallthrough { taken } else { fallthrough };
                let body = self.arm(arm_start, scope.until(Some(merge)))?;
                branches.push((Condition::new(expression, arm_start == fallthrough), body));
                follow = Some(merge);
            }
            Some(merge) => {
                let then = self.arm(first, scope.until(Some(merge)))?;
                branches.push((Condition::new(expression, first == fallthrough), then));
                let other = self.region(second, scope.until(Some(merge)))?;
                otherwise = collapse_else(&mut branches, other);
                follow = Some(merge);
            }
            // Only the exit post-dominates: look for a guard clause.
            None => {
                let guard = [(first, second), (second, first)].into_iter().find(|&(arm, rest)| {
                    !self.reaches(arm, rest, scope) && !self.escapes(arm, scope)
                });
                match guard {
                    Some((arm, rest)) => {
                        let body = self.arm(arm, scope.until(Some(rest)))?;
                        branches.push((Condition::new(expression, arm == fallthrough), body));
                        follow = Some(rest);
                    }
                    None => {
                        let then = self.arm(first, scope)?;
                        branches.push((Condition::new(expression, first == fallthrough), then));
                        let other = self.region(second, scope)?;
                        otherwise = collapse_else(&mut branches, other);
                        follow = None;
                    }
                }
            }
        }

        let mut statements = statements;
        statements.extend(prelude);
        let mut pieces = sequence(statements);
        pieces.push(Construct::If {
            branches,
            otherwise,
            next: None,
        });
        Ok((pieces, follow))
    }

    fn switch(
        &mut self,
        node: NodeId,
        statements: Vec<Instruction>,
        cases: &[(i32, NodeId)],
        default: NodeId,
        scope: Scope,
    ) -> Result<Step> {
        let expression = match self.terminator(node)? {
            Instruction::Switch { expression, .. } => expression.clone(),
            other => return Err(self.failure(format!("expected a switch, found `{other}`"))),
        };
        let mut groups: BTreeMap<NodeId, BTreeSet<i32>> = BTreeMap::new();
        for &(value, target) in cases {
            groups
                .entry(self.cfg.forward(target))
                .or_default()
                .insert(value);
        }
        let default = self.cfg.forward(default);

        let merge = match self.merge_point(node) {
            Some(merge) => Some(merge),
            None => {
                let mut targets: Vec<NodeId> = groups.keys().copied().collect();
                targets.push(default);
                self.common_tail(&targets, scope)
            }
        };
        let arm_scope = scope.until(merge.or(scope.stop));

        let mut arms = Vec::with_capacity(groups.len());
        for (target, values) in groups {
            let body = if Some(target) == merge {
                Construct::empty()
            } else {
                self.arm(target, arm_scope)?
            };
            arms.push((values, body));
        }

        let default = if Some(default) == merge {
            None
        } else {
            self.region(default, arm_scope)?.map(Box::new)
        };

        let mut pieces = sequence(statements);
        pieces.push(Construct::Switch {
            expression,
            cases: arms,
            default,
            next: None,
        });
        Ok((pieces, merge))
    }

    /// Returns the post-dominators of `node` inside the scope, nearest first,
    /// starting with `node` itself.
    fn post_dominator_chain(&self, node: NodeId, scope: Scope) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            if scope.ends_at(n) || chain.contains(&n) || chain.len() > self.cfg.block_count() {
                break;
            }
            chain.push(n);
            current = self.merge_point(n);
        }
        chain
    }

    /// Picks where a switch continues when only the exit post-dominates it:
    /// the nearest block that post-dominates the most arms, provided at least
    /// two arms meet there and no other arm reaches it.
    fn common_tail(&self, targets: &[NodeId], scope: Scope) -> Option<NodeId> {
        let chains: Vec<Vec<NodeId>> = targets
            .iter()
            .map(|&target| self.post_dominator_chain(target, scope))
            .collect();
        let count = |n: NodeId| chains.iter().filter(|chain| chain.contains(&n)).count();

        let best = chains.iter().flatten().map(|&n| count(n)).max()?;
        if best < 2 {
            return None;
        }
        let tail = chains
            .iter()
            .flatten()
            .copied()
            .find(|&n| count(n) == best)?;

        let clean = targets
            .iter()
            .zip(&chains)
            .all(|(&target, chain)| chain.contains(&tail) || !self.reaches(target, tail, scope));
        clean.then_some(tail)
    }

    /// Every block with code must have been placed exactly once.
    fn check_placement(&self) -> Result<()> {
        let dominators = self.cfg.dominators();
        for (node, block) in self.cfg.blocks() {
            let placed = self.visited.get(node.index()).copied().unwrap_or(false);
            let has_code = !block.body.is_empty()
                || matches!(block.exit, BlockExit::Branch { .. } | BlockExit::Switch { .. });
            if placed || block.is_trampoline() || !has_code {
                continue;
            }
            if dominators.is_reachable(node) {
                return Err(self.failure(format!("block B{} was never placed", node.index())));
            }
            warn!(
                "Dropping unreachable block B{} of script {}",
                node.index(),
                self.cfg.function().id
            );
        }
        Ok(())
    }
}

/// Returns `true` for an assignment that only copies a variable or a literal,
/// which is safe to evaluate ahead of a short-circuited test.
fn is_copy(instruction: &Instruction) -> bool {
    match instruction {
        Instruction::Assignment {
            definitions,
            expression,
        } => {
            definitions.iter().all(|d| matches!(d, Expr::Var { .. }))
                && matches!(
                    expression,
                    Expr::Var { .. } | Expr::Cst { .. } | Expr::EventProperty(_)
                )
        }
        _ => false,
    }
}

fn sequence(statements: Vec<Instruction>) -> Vec<Construct> {
    if statements.is_empty() {
        Vec::new()
    } else {
        vec![Construct::Seq {
            instructions: statements,
            next: None,
        }]
    }
}

/// Links pieces through `next`, merging adjacent sequences.
fn chain(pieces: Vec<Construct>) -> Option<Construct> {
    let mut next: Option<Construct> = None;
    for piece in pieces.into_iter().rev() {
        next = Some(match (piece, next) {
            (
                Construct::Seq {
                    mut instructions,
                    next: None,
                },
                Some(Construct::Seq {
                    instructions: more,
                    next: rest,
                }),
            ) => {
                instructions.extend(more);
                Construct::Seq {
                    instructions,
                    next: rest,
                }
            }
            (mut piece, next) => {
                *piece.next_mut() = next.map(Box::new);
                piece
            }
        });
    }
    next
}

/// Turns an `else { if .. }` into `else if ..` when nothing follows the inner if.
fn collapse_else(
    branches: &mut Vec<(Condition, Construct)>,
    otherwise: Option<Construct>,
) -> Option<Box<Construct>> {
    match otherwise? {
        Construct::If {
            branches: inner,
            otherwise,
            next: None,
        } => {
            branches.extend(inner);
            otherwise
        }
        Construct::Seq {
            instructions,
            next: Some(inner),
        } => match *inner {
            Construct::If {
                branches: mut inner,
                otherwise,
                next: None,
            } => {
                if let Some((condition, _)) = inner.first_mut() {
                    let mut prelude = instructions;
                    prelude.append(&mut condition.prelude);
                    condition.prelude = prelude;
                }
                branches.extend(inner);
                otherwise
            }
            other => Some(Box::new(Construct::Seq {
                instructions,
                next: Some(Box::new(other)),
            })),
        },
        other if other.is_empty() => None,
        other => Some(Box::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ir::{InstructionChain, Label, Variable};

    fn cond(id: i32) -> Expr {
        Expr::Pointer(Variable::Varp(id))
    }

    fn stmt(id: i32) -> Instruction {
        Instruction::Assignment {
            definitions: vec![],
            expression: Expr::Pointer(Variable::Varbit(id)),
        }
    }

    fn branch(c: i32, target: usize) -> Instruction {
        Instruction::Branch {
            condition: cond(c),
            target: Label(target),
        }
    }

    fn label(pc: usize) -> Instruction {
        Instruction::Label(Label(pc))
    }

    fn goto(pc: usize) -> Instruction {
        Instruction::Goto(Label(pc))
    }

    fn ret() -> Instruction {
        Instruction::Return(vec![])
    }

    fn function(instructions: Vec<Instruction>) -> Function {
        Function {
            id: 3,
            arguments: vec![],
            instructions: instructions.into_iter().collect::<InstructionChain>(),
            return_types: vec![],
        }
    }

    fn seq(instructions: Vec<Instruction>, next: Option<Construct>) -> Construct {
        Construct::Seq {
            instructions,
            next: next.map(Box::new),
        }
    }

    /// The original sequence minus labels, gotos, branches and switches.
    fn kept(function: &Function) -> Vec<Instruction> {
        function
            .instructions
            .instructions()
            .filter(|insn| matches!(insn, Instruction::Assignment { .. } | Instruction::Return(_)))
            .cloned()
            .collect()
    }

    fn assert_flattens_to_original(function: &Function, tree: &Construct) {
        let flat: Vec<Instruction> = tree.flatten().into_iter().cloned().collect();
        assert_eq!(flat, kept(function));
    }

    #[test]
    fn test_if_else_with_merge() {
        // if (c) goto THEN; goto ELSE; THEN: A; goto END; ELSE: B; END: C; return
        let function = function(vec![
            branch(0, 2),
            goto(5),
            label(2),
            stmt(1),
            goto(7),
            label(5),
            stmt(2),
            label(7),
            stmt(3),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let expected = Construct::If {
            branches: vec![(Condition::new(cond(0), false), seq(vec![stmt(1)], None))],
            otherwise: Some(Box::new(seq(vec![stmt(2)], None))),
            next: Some(Box::new(seq(vec![stmt(3), ret()], None))),
        };
        assert_eq!(tree, expected);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_fallthrough_arm_comes_first() {
        // if (c) goto B; A; goto END; B: B; END: return
        let function = function(vec![
            branch(0, 4),
            stmt(1),
            goto(6),
            label(4),
            stmt(2),
            label(6),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        match &tree {
            Construct::If {
                branches,
                otherwise,
                next,
            } => {
                assert_eq!(branches.len(), 1);
                assert!(branches[0].0.negated);
                assert_eq!(branches[0].1, seq(vec![stmt(1)], None));
                assert_eq!(otherwise.as_deref(), Some(&seq(vec![stmt(2)], None)));
                assert_eq!(next.as_deref(), Some(&seq(vec![ret()], None)));
            }
            other => panic!("expected an if, got {other:?}"),
        }
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_one_armed_if() {
        // A; if (c) goto SKIP; B; SKIP: return
        let function = function(vec![stmt(1), branch(0, 4), stmt(2), label(4), ret()]);
        let tree = reconstruct(&function).unwrap();

        let expected = seq(
            vec![stmt(1)],
            Some(Construct::If {
                branches: vec![(Condition::new(cond(0), true), seq(vec![stmt(2)], None))],
                otherwise: None,
                next: Some(Box::new(seq(vec![ret()], None))),
            }),
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_else_if_chain_collapses() {
        // if (c0) goto A; goto N1; A: 1; goto END;
        // N1: 5; if (c1) goto B; goto N2; B: 2; goto END;
        // N2: 3; END: return
        let function = function(vec![
            branch(0, 2),
            goto(5),
            label(2),
            stmt(1),
            goto(14),
            label(5),
            stmt(5),
            branch(1, 9),
            goto(12),
            label(9),
            stmt(2),
            goto(14),
            label(12),
            stmt(3),
            label(14),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        match &tree {
            Construct::If {
                branches,
                otherwise,
                next,
            } => {
                assert_eq!(branches.len(), 2);
                assert!(branches[0].0.prelude.is_empty());
                assert_eq!(branches[1].0.prelude, vec![stmt(5)]);
                assert_eq!(branches[1].1, seq(vec![stmt(2)], None));
                assert_eq!(otherwise.as_deref(), Some(&seq(vec![stmt(3)], None)));
                assert_eq!(next.as_deref(), Some(&seq(vec![ret()], None)));
            }
            other => panic!("expected an if, got {other:?}"),
        }
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_while_loop() {
        // HEAD: 9; if (c) goto BODY; goto EXIT; BODY: 1; goto HEAD; EXIT: return
        let function = function(vec![
            label(0),
            stmt(9),
            branch(0, 3),
            goto(6),
            label(3),
            stmt(1),
            goto(0),
            label(6),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let mut condition = Condition::new(cond(0), false);
        condition.prelude.push(stmt(9));
        let expected = Construct::While {
            condition,
            body: Box::new(seq(vec![stmt(1)], None)),
            next: Some(Box::new(seq(vec![ret()], None))),
        };
        assert_eq!(tree, expected);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_if_inside_loop_merges_at_header() {
        // HEAD: if (c0) goto BODY; goto EXIT;
        // BODY: if (c1) goto INC; 7; INC: 1; goto HEAD; EXIT: return
        let function = function(vec![
            label(0),
            branch(0, 3),
            goto(8),
            label(3),
            branch(1, 6),
            stmt(7),
            label(6),
            stmt(1),
            goto(0),
            label(8),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();
        assert!(matches!(tree, Construct::While { .. }));
        assert_eq!(tree.depth(), 3);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_guard_clause() {
        // if (c) goto REST; return; REST: 1; return
        let function = function(vec![branch(0, 3), ret(), label(3), stmt(1), ret()]);
        let tree = reconstruct(&function).unwrap();

        let expected = Construct::If {
            branches: vec![(Condition::new(cond(0), true), seq(vec![ret()], None))],
            otherwise: None,
            next: Some(Box::new(seq(vec![stmt(1), ret()], None))),
        };
        assert_eq!(tree, expected);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_switch_groups_cases() {
        let mut cases = BTreeMap::new();
        cases.insert(1, Label(3));
        cases.insert(2, Label(3));
        cases.insert(5, Label(6));
        // switch; goto END; C12: 1; goto END; C5: 2; END: return
        let function = function(vec![
            Instruction::Switch {
                expression: cond(0),
                cases,
            },
            goto(8),
            label(3),
            stmt(1),
            goto(8),
            label(6),
            stmt(2),
            label(8),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        match &tree {
            Construct::Switch {
                cases,
                default,
                next,
                ..
            } => {
                assert_eq!(cases.len(), 2);
                assert_eq!(cases[0].0, BTreeSet::from([1, 2]));
                assert_eq!(cases[0].1, seq(vec![stmt(1)], None));
                assert_eq!(cases[1].0, BTreeSet::from([5]));
                assert!(default.is_none());
                assert_eq!(next.as_deref(), Some(&seq(vec![ret()], None)));
            }
            other => panic!("expected a switch, got {other:?}"),
        }
        assert_flattens_to_original(&function, &tree);
    }

    fn joined(opcode: u16, left: Expr, right: Expr) -> Expr {
        Expr::Operation {
            opcode,
            arguments: vec![left, right],
            results: vec![],
            typings: vec![],
            dot: false,
        }
    }

    #[test]
    fn test_short_circuit_or() {
        // if (c0) goto T; if (c1) goto T; goto END; T: 1; END: 2; return
        let function = function(vec![
            branch(0, 3),
            branch(1, 3),
            goto(5),
            label(3),
            stmt(1),
            label(5),
            stmt(2),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let expected = Construct::If {
            branches: vec![(
                Condition::new(joined(SS_OR, cond(0), cond(1)), false),
                seq(vec![stmt(1)], None),
            )],
            otherwise: None,
            next: Some(Box::new(seq(vec![stmt(2), ret()], None))),
        };
        assert_eq!(tree, expected);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_short_circuit_and() {
        // if (c0) goto NEXT; goto END; NEXT: if (c1) goto T; goto END; T: 1; END: 2; return
        let function = function(vec![
            branch(0, 2),
            goto(7),
            label(2),
            branch(1, 5),
            goto(7),
            label(5),
            stmt(1),
            label(7),
            stmt(2),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let expected = Construct::If {
            branches: vec![(
                Condition::new(joined(SS_AND, cond(0), cond(1)), false),
                seq(vec![stmt(1)], None),
            )],
            otherwise: None,
            next: Some(Box::new(seq(vec![stmt(2), ret()], None))),
        };
        assert_eq!(tree, expected);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_branch_after_statements_is_not_folded() {
        // if (c0) goto NEXT; goto END; NEXT: 4; if (c1) goto T; goto END; T: 1; END: return
        let function = function(vec![
            branch(0, 2),
            goto(8),
            label(2),
            stmt(4),
            branch(1, 6),
            goto(8),
            label(6),
            stmt(1),
            label(8),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let inner = Construct::If {
            branches: vec![(Condition::new(cond(1), false), seq(vec![stmt(1)], None))],
            otherwise: None,
            next: None,
        };
        let expected = Construct::If {
            branches: vec![(
                Condition::new(cond(0), false),
                seq(vec![stmt(4)], Some(inner)),
            )],
            otherwise: None,
            next: Some(Box::new(seq(vec![ret()], None))),
        };
        assert_eq!(tree, expected);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_switch_with_returning_default() {
        let mut cases = BTreeMap::new();
        cases.insert(1, Label(3));
        cases.insert(2, Label(6));
        // switch; 5; return; C1: 1; goto END; C2: 2; END: return
        let function = function(vec![
            Instruction::Switch {
                expression: cond(0),
                cases,
            },
            stmt(5),
            ret(),
            label(3),
            stmt(1),
            goto(8),
            label(6),
            stmt(2),
            label(8),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let expected = Construct::Switch {
            expression: cond(0),
            cases: vec![
                (BTreeSet::from([1]), seq(vec![stmt(1)], None)),
                (BTreeSet::from([2]), seq(vec![stmt(2)], None)),
            ],
            default: Some(Box::new(seq(vec![stmt(5), ret()], None))),
            next: Some(Box::new(seq(vec![ret()], None))),
        };
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_nested_while() {
        // OUTER: if (c0) goto BODY; goto EXIT;
        // BODY: 1; INNER: if (c1) goto STEP; goto TAIL; STEP: 2; goto INNER;
        // TAIL: 3; goto OUTER; EXIT: return
        let function = function(vec![
            label(0),
            branch(0, 3),
            goto(14),
            label(3),
            stmt(1),
            label(5),
            branch(1, 8),
            goto(11),
            label(8),
            stmt(2),
            goto(5),
            label(11),
            stmt(3),
            goto(0),
            label(14),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let inner = Construct::While {
            condition: Condition::new(cond(1), false),
            body: Box::new(seq(vec![stmt(2)], None)),
            next: Some(Box::new(seq(vec![stmt(3)], None))),
        };
        let expected = Construct::While {
            condition: Condition::new(cond(0), false),
            body: Box::new(seq(vec![stmt(1)], Some(inner))),
            next: Some(Box::new(seq(vec![ret()], None))),
        };
        assert_eq!(tree, expected);
        assert_eq!(tree.depth(), 3);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_continue_in_loop() {
        // HEAD: if (c0) goto BODY; goto EXIT; BODY: if (c1) goto HEAD; 1; goto HEAD; EXIT: return
        let function = function(vec![
            label(0),
            branch(0, 3),
            goto(7),
            label(3),
            branch(1, 0),
            stmt(1),
            goto(0),
            label(7),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let expected = Construct::While {
            condition: Condition::new(cond(0), false),
            body: Box::new(Construct::If {
                branches: vec![(Condition::new(cond(1), true), seq(vec![stmt(1)], None))],
                otherwise: None,
                next: None,
            }),
            next: Some(Box::new(seq(vec![ret()], None))),
        };
        assert_eq!(tree, expected);
        assert_flattens_to_original(&function, &tree);
    }

    #[test]
    fn test_return_inside_loop() {
        // HEAD: if (c0) goto BODY; goto EXIT;
        // BODY: if (c1) goto OUT; 1; goto HEAD; OUT: 2; return; EXIT: return
        let function = function(vec![
            label(0),
            branch(0, 3),
            goto(10),
            label(3),
            branch(1, 7),
            stmt(1),
            goto(0),
            label(7),
            stmt(2),
            ret(),
            label(10),
            ret(),
        ]);
        let tree = reconstruct(&function).unwrap();

        let expected = Construct::While {
            condition: Condition::new(cond(0), false),
            body: Box::new(Construct::If {
                branches: vec![(
                    Condition::new(cond(1), false),
                    seq(vec![stmt(2), ret()], None),
                )],
                otherwise: None,
                next: Some(Box::new(seq(vec![stmt(1)], None))),
            }),
            next: Some(Box::new(seq(vec![ret()], None))),
        };
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_unreachable_block_is_dropped() {
        let function = function(vec![ret(), stmt(1), ret()]);
        let tree = reconstruct(&function).unwrap();
        assert_eq!(tree, seq(vec![ret()], None));
    }

    #[test]
    fn test_loop_without_exit_fails() {
        // HEAD: 1; goto HEAD
        let function = function(vec![label(0), stmt(1), goto(0)]);
        let err = reconstruct(&function).unwrap_err();
        assert!(matches!(err, Error::StructuringFailure { script: 3, .. }));
    }
}
