//! Call typing: resolve, instantiate, visit.

use tern_ir::{ExprId, ExprRange, Name, Span};

use super::{Frame, InferEngine};
use crate::instantiate::{CallTarget, DispatchSlot, DispatchTable};
use crate::pool::Members;
use crate::resolve::DispatchTarget;
use crate::{ClassId, Idx, TypeError};

impl InferEngine<'_> {
    /// Type a call: the union of the return types of every dispatch target.
    ///
    /// A `Never` receiver or argument makes the call unreachable; nothing
    /// is resolved or instantiated for it.
    pub(super) fn infer_call(
        &mut self,
        frame: &mut Frame,
        call: ExprId,
        receiver: Option<ExprId>,
        method: Name,
        args: ExprRange,
    ) -> Result<Idx, TypeError> {
        let module = self.module;

        let receiver_type = match receiver {
            Some(receiver) => {
                let ty = self.infer_expr(frame, receiver)?;
                if ty.is_never() {
                    return Ok(Idx::NEVER);
                }
                Some(ty)
            }
            None => None,
        };
        let mut arg_types = Members::new();
        for &arg in module.arena.list(args) {
            let ty = self.infer_expr(frame, arg)?;
            if ty.is_never() {
                return Ok(Idx::NEVER);
            }
            arg_types.push(ty);
        }

        let span = module.arena.span(call);
        // Outside methods `self` is an `Object`, as for `ExprKind::SelfRef`.
        let self_type = frame.self_type.unwrap_or(Idx::OBJECT);
        let resolution = if receiver.is_some() {
            self.resolver()
                .resolve(method, receiver_type, &arg_types, span)?
        } else {
            self.resolver()
                .resolve_implicit(method, Some(self_type), &arg_types, span)?
        };

        let mut table = DispatchTable::default();
        let mut result = Idx::NEVER;
        for entry in resolution.entries {
            let (target, ty) = match entry.target {
                DispatchTarget::Definition(def) => {
                    let id = self.instantiate(def, entry.receiver, entry.args.clone());
                    (CallTarget::Instance(id), self.visit(id)?)
                }
                DispatchTarget::Allocate(class) => {
                    (CallTarget::Allocate(class), self.pool.concrete(class))
                }
                DispatchTarget::New(class) => self.infer_new(class, &entry.args, span)?,
            };
            result = self.pool.union(result, ty);
            table.insert(DispatchSlot {
                receiver: entry.receiver,
                args: entry.args,
                target,
            });
        }

        frame.body.dispatch.entry(call).or_default().merge(table);
        Ok(result)
    }

    /// `Foo.new(args)`: a `Foo` whose `initialize(args)` has been
    /// instantiated. With no `initialize` anywhere on the chain, only a
    /// zero-argument `new` is accepted.
    fn infer_new(
        &mut self,
        class: ClassId,
        args: &[Idx],
        span: Span,
    ) -> Result<(CallTarget, Idx), TypeError> {
        let instance = self.pool.concrete(class);
        let initialize = self.names.initialize;
        let defined = self
            .overloads
            .has_candidates(&self.pool, &self.classes, initialize, instance);
        if !defined && args.is_empty() {
            return Ok((
                CallTarget::New {
                    class,
                    initialize: None,
                },
                instance,
            ));
        }

        let resolution = self
            .resolver()
            .resolve(initialize, Some(instance), args, span)?;
        let mut init = None;
        for def in resolution.definitions() {
            let id = self.instantiate(def, Some(instance), args.iter().copied().collect());
            self.visit(id)?;
            init = Some(id);
        }
        Ok((
            CallTarget::New {
                class,
                initialize: init,
            },
            instance,
        ))
    }
}
