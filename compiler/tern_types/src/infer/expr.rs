//! Expression typing.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tern_ir::{ExprId, ExprKind, Intrinsic, Name};
use tern_stack::ensure_sufficient_stack;
use tracing::trace;

use super::{Frame, InferEngine, Locals};
use crate::{Idx, TypeError, TypeErrorKind};

impl InferEngine<'_> {
    /// Type an expression and record it in the frame's body.
    pub(super) fn infer_expr(&mut self, frame: &mut Frame, id: ExprId) -> Result<Idx, TypeError> {
        let ty = ensure_sufficient_stack(|| self.infer_expr_inner(frame, id))?;
        let slot = frame.body.expr_types.entry(id).or_insert(Idx::NEVER);
        *slot = self.pool.union(*slot, ty);
        Ok(ty)
    }

    fn infer_expr_inner(&mut self, frame: &mut Frame, id: ExprId) -> Result<Idx, TypeError> {
        let module = self.module;
        let arena = &module.arena;
        match arena.kind(id) {
            ExprKind::Nil => Ok(Idx::NIL),
            ExprKind::Bool(_) => Ok(Idx::BOOL),
            ExprKind::Int(_) => Ok(Idx::INT),
            ExprKind::Float(_) => Ok(Idx::FLOAT),
            ExprKind::SelfRef => Ok(frame.self_type.unwrap_or(Idx::OBJECT)),

            ExprKind::Var(name) => Ok(frame.local(*name).unwrap_or(Idx::NIL)),
            ExprKind::Assign { name, value } => {
                let ty = self.infer_expr(frame, *value)?;
                if !ty.is_never() {
                    let old = frame.local(*name).unwrap_or(Idx::NEVER);
                    let widened = self.pool.union(old, ty);
                    frame.locals.insert(*name, widened);
                }
                Ok(ty)
            }

            ExprKind::InstanceVar(name) => Ok(match frame.self_class {
                Some(class) => {
                    let assigned = self.classes.ivar_type(class, *name).unwrap_or(Idx::NEVER);
                    self.pool.nilable(assigned)
                }
                None => Idx::NIL,
            }),
            ExprKind::InstanceVarAssign { name, value } => {
                let ty = self.infer_expr(frame, *value)?;
                if let (Some(class), false) = (frame.self_class, ty.is_never()) {
                    if self.classes.widen_ivar(&mut self.pool, class, *name, ty) {
                        self.changed = true;
                        trace!(
                            ivar = self.interner.lookup(*name),
                            ?class,
                            "widened instance variable"
                        );
                    }
                }
                Ok(ty)
            }

            ExprKind::Const(name) => {
                let class = self
                    .classes
                    .resolve_name(*name, arena.span(id), self.interner)?;
                Ok(self.pool.metaclass(class))
            }

            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.infer_call(frame, id, *receiver, *method, *args),

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond_ty = self.infer_expr(frame, *cond)?;
                if cond_ty.is_never() {
                    return Ok(Idx::NEVER);
                }
                let entry = frame.locals.clone();
                let then_ty = self.infer_then_branch(frame, *cond, *then_branch)?;
                let then_locals = std::mem::replace(&mut frame.locals, entry);
                let else_ty = match else_branch {
                    Some(branch) => self.infer_expr(frame, *branch)?,
                    None => Idx::NIL,
                };
                let else_locals = std::mem::take(&mut frame.locals);
                frame.locals = self.join_locals(
                    (then_locals, then_ty.is_never()),
                    (else_locals, else_ty.is_never()),
                );
                Ok(self.pool.union(then_ty, else_ty))
            }

            ExprKind::While { cond, body } => {
                let mut rounds = 0;
                let mut bound_on_entry = None;
                loop {
                    let before = frame.locals.clone();
                    let cond_ty = self.infer_expr(frame, *cond)?;
                    bound_on_entry.get_or_insert_with(|| bound_names(frame));
                    if !cond_ty.is_never() {
                        self.infer_expr(frame, *body)?;
                    }
                    if frame.locals == before {
                        break;
                    }
                    rounds += 1;
                    if rounds >= self.config.max_loop_rounds {
                        return Err(TypeError::new(
                            TypeErrorKind::InferenceDivergence {
                                name: "while".to_string(),
                                rounds,
                            },
                            arena.span(id),
                        ));
                    }
                }
                // The body may run zero times.
                if let Some(bound) = bound_on_entry {
                    self.nil_unless_bound(frame, &bound);
                }
                Ok(Idx::NIL)
            }

            ExprKind::And { left, right } | ExprKind::Or { left, right } => {
                let left = self.infer_expr(frame, *left)?;
                if left.is_never() {
                    return Ok(Idx::NEVER);
                }
                // The right side may not run.
                let bound = bound_names(frame);
                let right = self.infer_expr(frame, *right)?;
                self.nil_unless_bound(frame, &bound);
                Ok(self.pool.union(left, right))
            }

            ExprKind::Return(value) => {
                let ty = match value {
                    Some(value) => self.infer_expr(frame, *value)?,
                    None => Idx::NIL,
                };
                frame.returns = self.pool.union(frame.returns, ty);
                Ok(Idx::NEVER)
            }

            ExprKind::Block(stmts) => {
                let mut last = Idx::NIL;
                for &stmt in arena.list(*stmts) {
                    last = self.infer_expr(frame, stmt)?;
                    // The rest of the block is unreachable.
                    if last.is_never() {
                        break;
                    }
                }
                Ok(last)
            }

            ExprKind::Intrinsic { op, args } => {
                let mut operands: SmallVec<[Idx; 2]> = SmallVec::new();
                for &arg in arena.list(*args) {
                    let ty = self.infer_expr(frame, arg)?;
                    if ty.is_never() {
                        return Ok(Idx::NEVER);
                    }
                    operands.push(ty);
                }
                self.intrinsic_type(*op, &operands, id)
            }
        }
    }

    /// Type the then-branch of an `if`, narrowing `x` in `if x = e` and
    /// `if x` to its non-nil members.
    fn infer_then_branch(
        &mut self,
        frame: &mut Frame,
        cond: ExprId,
        then_branch: ExprId,
    ) -> Result<Idx, TypeError> {
        let narrowed = match self.module.arena.kind(cond) {
            ExprKind::Assign { name, .. } | ExprKind::Var(name) => Some(*name),
            _ => None,
        };
        let Some(name) = narrowed else {
            return self.infer_expr(frame, then_branch);
        };

        let full = frame.local(name).unwrap_or(Idx::NIL);
        let narrow = self.pool.without_nil(full);
        frame.locals.insert(name, narrow);
        let result = self.infer_expr(frame, then_branch);
        let after = frame.local(name).unwrap_or(narrow);
        let merged = self.pool.union(full, after);
        frame.locals.insert(name, merged);
        result
    }

    /// Locals after two alternative paths. A path typed `Never` does not
    /// reach the join; on a path that does, a name it never bound is `Nil`.
    fn join_locals(&mut self, (a, a_dead): (Locals, bool), (b, b_dead): (Locals, bool)) -> Locals {
        match (a_dead, b_dead) {
            (false, true) => return a,
            (true, false) => return b,
            _ => {}
        }
        let missing = if a_dead { Idx::NEVER } else { Idx::NIL };
        let names: FxHashSet<Name> = a.keys().chain(b.keys()).copied().collect();
        names
            .into_iter()
            .map(|name| {
                let left = a.get(&name).copied().unwrap_or(missing);
                let right = b.get(&name).copied().unwrap_or(missing);
                (name, self.pool.union(left, right))
            })
            .collect()
    }

    /// Make every local not in `bound` nilable.
    fn nil_unless_bound(&mut self, frame: &mut Frame, bound: &FxHashSet<Name>) {
        for (name, ty) in &mut frame.locals {
            if !bound.contains(name) {
                *ty = self.pool.nilable(*ty);
            }
        }
    }

    fn intrinsic_type(&mut self, op: Intrinsic, operands: &[Idx], id: ExprId) -> Result<Idx, TypeError> {
        if op.is_comparison() {
            return Ok(Idx::BOOL);
        }
        match op {
            Intrinsic::ToInt => return Ok(Idx::INT),
            Intrinsic::ToFloat => return Ok(Idx::FLOAT),
            _ => {}
        }

        let number = self.pool.union(Idx::INT, Idx::FLOAT);
        if let Some(&bad) = operands
            .iter()
            .find(|&&t| !self.classes.is_subtype(&self.pool, t, number))
        {
            return Err(TypeError::new(
                TypeErrorKind::TypeRestrictionViolation {
                    method: op.method_name().to_string(),
                    param: "self".to_string(),
                    expected: self.type_name(number),
                    found: self.type_name(bad),
                },
                self.module.arena.span(id),
            ));
        }
        Ok(if operands.iter().all(|&t| t == Idx::INT) {
            Idx::INT
        } else if operands.contains(&Idx::FLOAT) {
            Idx::FLOAT
        } else {
            number
        })
    }
}

fn bound_names(frame: &Frame) -> FxHashSet<Name> {
    frame.locals.keys().copied().collect()
}
