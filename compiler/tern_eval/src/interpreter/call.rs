//! Call evaluation: dispatch-table lookup, argument binding and builtins.

use smallvec::SmallVec;
use tern_ir::{ExprId, Name, Span};
use tern_stack::ensure_sufficient_stack;
use tern_types::{CallTarget, Idx, InstId};
use tracing::trace;

use super::{Flow, Frame, Interpreter, Unwind};
use crate::errors::{EvalError, EvalErrorKind, EvalResult};
use crate::Value;

impl<'a> Interpreter<'a> {
    pub(super) fn eval_call(
        &mut self,
        frame: &mut Frame<'a>,
        id: ExprId,
        receiver: Option<ExprId>,
        method: Name,
        args: &[ExprId],
    ) -> Flow {
        let receiver = match receiver {
            Some(receiver) => Some(self.eval(frame, receiver)?),
            None => None,
        };
        let mut values = Vec::with_capacity(args.len());
        for &arg in args {
            values.push(self.eval(frame, arg)?);
        }

        let span = self.module.arena.span(id);
        let (target, callee_self) = self
            .select(frame, id, receiver.as_ref(), &values)
            .ok_or_else(|| self.no_dispatch(method, span, receiver.as_ref(), &values))?;

        let value = match target {
            CallTarget::Instance(inst) => self.invoke(inst, callee_self, values, span)?,
            CallTarget::Allocate(class) => Value::object(class),
            CallTarget::New { class, initialize } => {
                let object = Value::object(class);
                if let Some(initialize) = initialize {
                    self.invoke(initialize, Some(object.clone()), values, span)?;
                }
                object
            }
        };
        Ok(value)
    }

    /// Find the target for the runtime types at call site `id`, along with
    /// the callee's `self`.
    ///
    /// A call without a receiver first tries the caller's own `self` (the
    /// main object outside methods), then free functions.
    fn select(
        &self,
        frame: &Frame<'a>,
        id: ExprId,
        receiver: Option<&Value>,
        args: &[Value],
    ) -> Option<(CallTarget, Option<Value>)> {
        let pool = &self.program.pool;
        let table = frame.body.dispatch(id)?;
        let arg_types: SmallVec<[Idx; 4]> = args
            .iter()
            .map(|arg| arg.type_idx(pool))
            .collect::<Option<_>>()?;

        if let Some(receiver) = receiver {
            let ty = receiver.type_idx(pool)?;
            return table
                .lookup(Some(ty), &arg_types)
                .map(|target| (target, Some(receiver.clone())));
        }
        let own = frame.receiver.as_ref().unwrap_or(&self.main_object);
        if let Some(ty) = own.type_idx(pool) {
            if let Some(target) = table.lookup(Some(ty), &arg_types) {
                return Some((target, Some(own.clone())));
            }
        }
        table.lookup(None, &arg_types).map(|target| (target, None))
    }

    /// Run one instantiation with `args` bound to its parameters.
    fn invoke(
        &mut self,
        inst: InstId,
        receiver: Option<Value>,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult {
        if self.depth >= self.config.max_call_depth {
            return Err(EvalError::new(
                EvalErrorKind::StackOverflow {
                    depth: self.config.max_call_depth,
                },
                span,
            ));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.run_body(inst, receiver, args));
        self.depth -= 1;
        result
    }

    fn run_body(&mut self, inst: InstId, receiver: Option<Value>, args: Vec<Value>) -> EvalResult {
        let program = self.program;
        let unit = program.instances.get(inst);
        let def = &program.overloads.get(unit.key.def).def;
        trace!(?inst, name = self.interner.lookup(def.name), "call");

        let mut frame = Frame::new(receiver, &unit.body);
        let mut args = args.into_iter();
        // Omitted trailing arguments take their defaults, left to right, in
        // the callee's frame.
        for param in &def.params {
            let value = match (args.next(), param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => match self.eval(&mut frame, default) {
                    Ok(value) | Err(Unwind::Return(value)) => value,
                    Err(Unwind::Error(error)) => return Err(error),
                },
                (None, None) => Value::Nil,
            };
            frame.locals.insert(param.name, value);
        }

        match self.eval(&mut frame, def.body) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(error)) => Err(error),
        }
    }

    fn no_dispatch(
        &self,
        method: Name,
        span: Span,
        receiver: Option<&Value>,
        args: &[Value],
    ) -> Unwind {
        let program = self.program;
        let describe = |value: &Value| match value {
            Value::Object(obj) => self.interner.lookup(program.classes.name(obj.class)).to_string(),
            Value::Class(class) => {
                format!("{}.class", self.interner.lookup(program.classes.name(*class)))
            }
            other => other
                .type_idx(&program.pool)
                .map(|ty| program.type_name(ty, self.interner))
                .unwrap_or_default(),
        };
        EvalError::new(
            EvalErrorKind::NoDispatch {
                method: self.interner.lookup(method).to_string(),
                types: receiver.into_iter().chain(args).map(describe).collect(),
            },
            span,
        )
        .into()
    }
}
