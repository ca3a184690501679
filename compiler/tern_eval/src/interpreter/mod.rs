//! Tree-walking interpreter over finalized instantiations.
//!
//! Each call site looks up its target in the dispatch table of the unit
//! being run (the top level or an instantiation), keyed by the exact
//! runtime types of the receiver and arguments. Callee bodies run with the
//! dispatch tables of the selected instantiation.

mod call;

use rustc_hash::FxHashMap;
use tern_ir::{ExprId, ExprKind, Module, Name, StringInterner};
use tern_types::{ClassId, SpecializedBody, TypedProgram};
use tracing::debug;

use crate::errors::{EvalError, EvalErrorKind};
use crate::{operators, EvalConfig, Value};

/// Non-local exits while evaluating a body.
pub(crate) enum Unwind {
    /// `return` from the innermost call.
    Return(Value),
    Error(EvalError),
}

impl From<EvalError> for Unwind {
    fn from(error: EvalError) -> Self {
        Unwind::Error(error)
    }
}

type Flow = Result<Value, Unwind>;

/// Locals and dispatch tables of one running unit.
struct Frame<'p> {
    /// `None` at the top level and in free functions.
    receiver: Option<Value>,
    locals: FxHashMap<Name, Value>,
    body: &'p SpecializedBody,
}

impl<'p> Frame<'p> {
    fn new(receiver: Option<Value>, body: &'p SpecializedBody) -> Self {
        Frame {
            receiver,
            locals: FxHashMap::default(),
            body,
        }
    }
}

pub struct Interpreter<'a> {
    module: &'a Module,
    interner: &'a StringInterner,
    program: &'a TypedProgram,
    config: EvalConfig,
    depth: usize,
    /// `self` outside any method.
    main_object: Value,
}

/// Run `program`, returning the value of the last top-level statement.
pub fn run(
    module: &Module,
    interner: &StringInterner,
    program: &TypedProgram,
) -> Result<Value, EvalError> {
    run_with_config(module, interner, program, EvalConfig::default())
}

pub fn run_with_config(
    module: &Module,
    interner: &StringInterner,
    program: &TypedProgram,
    config: EvalConfig,
) -> Result<Value, EvalError> {
    Interpreter::new(module, interner, program, config).run()
}

impl<'a> Interpreter<'a> {
    pub fn new(
        module: &'a Module,
        interner: &'a StringInterner,
        program: &'a TypedProgram,
        config: EvalConfig,
    ) -> Self {
        Interpreter {
            module,
            interner,
            program,
            config,
            depth: 0,
            main_object: Value::object(ClassId::OBJECT),
        }
    }

    /// Evaluate the top-level statements in order.
    ///
    /// A top-level `return` ends the program with its value.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(mut self) -> Result<Value, EvalError> {
        let program = self.program;
        let mut frame = Frame::new(None, &program.main);
        let mut last = Value::Nil;
        for &stmt in &self.module.main {
            match self.eval(&mut frame, stmt) {
                Ok(value) => last = value,
                Err(Unwind::Return(value)) => {
                    debug!("top-level return");
                    return Ok(value);
                }
                Err(Unwind::Error(error)) => return Err(error),
            }
        }
        Ok(last)
    }

    fn eval(&mut self, frame: &mut Frame<'a>, id: ExprId) -> Flow {
        let module = self.module;
        let arena = &module.arena;
        match arena.kind(id) {
            ExprKind::Nil => Ok(Value::Nil),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::SelfRef => Ok(frame
                .receiver
                .clone()
                .unwrap_or_else(|| self.main_object.clone())),

            // A local not assigned on the path taken reads as `nil`.
            ExprKind::Var(name) => Ok(frame.locals.get(name).cloned().unwrap_or(Value::Nil)),
            ExprKind::Assign { name, value } => {
                let value = self.eval(frame, *value)?;
                frame.locals.insert(*name, value.clone());
                Ok(value)
            }

            ExprKind::InstanceVar(name) => Ok(match &frame.receiver {
                Some(Value::Object(obj)) => obj.ivar(*name),
                _ => Value::Nil,
            }),
            ExprKind::InstanceVarAssign { name, value } => {
                let value = self.eval(frame, *value)?;
                if let Some(Value::Object(obj)) = &frame.receiver {
                    obj.set_ivar(*name, value.clone());
                }
                Ok(value)
            }

            ExprKind::Const(name) => self
                .program
                .class_named(*name)
                .map(Value::Class)
                .ok_or_else(|| self.unbound(*name, id)),

            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.eval_call(frame, id, *receiver, *method, arena.list(*args)),

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(frame, *cond)?.is_truthy() {
                    self.eval(frame, *then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval(frame, *else_branch)
                } else {
                    Ok(Value::Nil)
                }
            }
            ExprKind::While { cond, body } => {
                while self.eval(frame, *cond)?.is_truthy() {
                    self.eval(frame, *body)?;
                }
                Ok(Value::Nil)
            }
            ExprKind::And { left, right } => {
                let left = self.eval(frame, *left)?;
                if left.is_truthy() {
                    self.eval(frame, *right)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Or { left, right } => {
                let left = self.eval(frame, *left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(frame, *right)
                }
            }
            ExprKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(frame, *value)?,
                    None => Value::Nil,
                };
                Err(Unwind::Return(value))
            }
            ExprKind::Block(stmts) => {
                let mut last = Value::Nil;
                for &stmt in arena.list(*stmts) {
                    last = self.eval(frame, stmt)?;
                }
                Ok(last)
            }
            ExprKind::Intrinsic { op, args } => {
                let mut operands = Vec::with_capacity(args.len());
                for &arg in arena.list(*args) {
                    operands.push(self.eval(frame, arg)?);
                }
                operators::apply(*op, &operands)
                    .map_err(|kind| EvalError::new(kind, arena.span(id)).into())
            }
        }
    }

    fn unbound(&self, name: Name, id: ExprId) -> Unwind {
        EvalError::new(
            EvalErrorKind::Unbound {
                name: self.interner.lookup(name).to_string(),
            },
            self.module.arena.span(id),
        )
        .into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests unwrap results of programs that must run")]
mod tests;
