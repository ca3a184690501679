//! Fixed-point type inference over the call graph.
//!
//! Each instantiation is a node. Visiting a node evaluates its body with the
//! key's argument types bound to the parameters; nested calls are resolved
//! and visited recursively. A node reached again while its own body is on
//! the stack answers with its provisional return type and is marked
//! revisited. When the body's result is not already covered by the
//! provisional type, the provisional widens and a revisited node is
//! evaluated again, up to `max_widening_rounds` times.
//!
//! Around that, whole-program passes repeat while anything observable
//! changed (a new instantiation, a widened return type, a widened instance
//! variable). Every node is re-evaluated at most once per pass unless it is
//! widening, so the loop terminates when the program stops growing.

mod call;
mod expr;

use rustc_hash::FxHashMap;
use tern_ir::{Module, Name, Param, Span, StringInterner};
use tern_stack::ensure_sufficient_stack;
use tracing::{debug, trace};

use crate::instantiate::{InstId, InstState, InstanceKey, SpecializedBody};
use crate::pool::Members;
use crate::{
    CallResolver, ClassId, ClassRegistry, DefId, Idx, InferConfig, InstantiationManager,
    OverloadRegistry, Pool, TypeError, TypeErrorKind, WellKnownNames,
};

/// Drives resolution, instantiation and widening for one module.
pub struct InferEngine<'a> {
    module: &'a Module,
    interner: &'a StringInterner,
    config: InferConfig,
    names: WellKnownNames,
    pool: Pool,
    classes: ClassRegistry,
    overloads: OverloadRegistry,
    instances: InstantiationManager,
    pass: u32,
    changed: bool,
}

type Locals = FxHashMap<Name, Idx>;

/// Evaluation state of one body: an instantiation or the top level.
struct Frame {
    self_type: Option<Idx>,
    /// Class whose instance-variable table `@x` refers to.
    self_class: Option<ClassId>,
    locals: Locals,
    /// Union of explicit `return` values.
    returns: Idx,
    body: SpecializedBody,
}

impl Frame {
    fn new(self_type: Option<Idx>, self_class: Option<ClassId>) -> Self {
        Frame {
            self_type,
            self_class,
            locals: FxHashMap::default(),
            returns: Idx::NEVER,
            body: SpecializedBody::default(),
        }
    }

    fn local(&self, name: Name) -> Option<Idx> {
        self.locals.get(&name).copied()
    }
}

/// Everything inference produced, before packaging.
pub(crate) struct Inferred {
    pub main: SpecializedBody,
    pub main_type: Idx,
    pub passes: u32,
    pub errors: Vec<TypeError>,
}

impl<'a> InferEngine<'a> {
    pub fn new(module: &'a Module, interner: &'a StringInterner, config: InferConfig) -> Self {
        let names = WellKnownNames::new(interner);
        let mut pool = Pool::new();
        let classes = ClassRegistry::new(&mut pool, &names);
        InferEngine {
            module,
            interner,
            config,
            names,
            pool,
            classes,
            overloads: OverloadRegistry::new(),
            instances: InstantiationManager::new(),
            pass: 0,
            changed: false,
        }
    }

    /// Register the module's classes, then its definitions.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn register(&mut self) -> Vec<TypeError> {
        let mut errors =
            self.classes
                .register_all(&mut self.pool, &self.module.classes, self.interner);
        errors.extend(self.overloads.add_all(
            &mut self.pool,
            &self.classes,
            &self.module.definitions,
            self.interner,
        ));
        errors
    }

    /// Run passes over the top-level program until nothing changes, then
    /// finalize every instantiation.
    ///
    /// Errors are collected per top-level statement and deduplicated across
    /// passes.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn infer(&mut self) -> Inferred {
        let mut errors: Vec<TypeError> = Vec::new();
        let mut converged = false;
        let mut passes = 0;

        while passes < self.config.max_passes {
            self.pass = passes;
            self.changed = false;
            passes += 1;

            let (_, _, pass_errors) = self.infer_main();
            for error in pass_errors {
                if !errors.contains(&error) {
                    errors.push(error);
                }
            }

            debug!(
                pass = self.pass,
                instances = self.instances.len(),
                changed = self.changed,
                "inference pass complete"
            );
            if !self.changed {
                converged = true;
                break;
            }
        }

        if !converged {
            errors.push(TypeError::new(
                TypeErrorKind::InferenceDivergence {
                    name: "<program>".to_string(),
                    rounds: self.config.max_passes,
                },
                Span::DUMMY,
            ));
        }

        self.instances.finalize_all();
        // Re-type the top level against the frozen return types.
        let (main, main_type, _) = self.infer_main();
        self.instances.finalize_all();

        Inferred {
            main,
            main_type,
            passes,
            errors,
        }
    }

    fn infer_main(&mut self) -> (SpecializedBody, Idx, Vec<TypeError>) {
        let module = self.module;
        let mut frame = Frame::new(None, None);
        let mut errors = Vec::new();
        let mut last = Idx::NIL;
        for &stmt in &module.main {
            match self.infer_expr(&mut frame, stmt) {
                Ok(ty) => last = ty,
                Err(error) => {
                    trace!(%error, "statement failed");
                    errors.push(error);
                    last = Idx::NEVER;
                }
            }
        }
        let main_type = self.pool.union(last, frame.returns);
        (frame.body, main_type, errors)
    }

    /// Look up or create the instantiation for a resolved call.
    fn instantiate(&mut self, def: DefId, receiver: Option<Idx>, args: Members) -> InstId {
        let (id, created) = self
            .instances
            .get_or_create(InstanceKey { def, receiver, args });
        if created {
            self.changed = true;
            trace!(?id, ?def, "created instantiation");
        }
        id
    }

    /// Visit a node, returning its (possibly provisional) return type.
    fn visit(&mut self, id: InstId) -> Result<Idx, TypeError> {
        let pass = self.pass;
        let inst = self.instances.get_mut(id);
        match inst.state {
            InstState::InProgress => {
                inst.revisited = true;
                return Ok(inst.return_type);
            }
            InstState::Finalized => return Ok(inst.return_type),
            InstState::Pending if inst.visited_pass == Some(pass) => {
                return Ok(inst.return_type);
            }
            InstState::Pending => {}
        }
        inst.state = InstState::InProgress;

        let result = ensure_sufficient_stack(|| self.widen_to_fixed_point(id));

        let inst = self.instances.get_mut(id);
        inst.state = InstState::Pending;
        inst.visited_pass = result.is_ok().then_some(pass);
        result
    }

    fn widen_to_fixed_point(&mut self, id: InstId) -> Result<Idx, TypeError> {
        for round in 1..=self.config.max_widening_rounds {
            self.instances.get_mut(id).revisited = false;
            let (result, body) = self.evaluate_instance(id)?;

            let provisional = self.instances.get(id).return_type;
            let widened = self.pool.union(provisional, result);
            let inst = self.instances.get_mut(id);
            inst.body = body;
            if widened == provisional {
                return Ok(provisional);
            }
            inst.return_type = widened;
            let revisited = inst.revisited;
            self.changed = true;
            debug!(?id, round, from = ?provisional, to = ?widened, "widened return type");
            if !revisited {
                return Ok(widened);
            }
        }

        let def = self.instances.get(id).key.def;
        Err(TypeError::new(
            TypeErrorKind::InferenceDivergence {
                name: self
                    .overloads
                    .signature(def, &self.pool, &self.classes, self.interner),
                rounds: self.config.max_widening_rounds,
            },
            self.overloads.get(def).def.span,
        ))
    }

    /// Evaluate one instantiation's body once.
    fn evaluate_instance(&mut self, id: InstId) -> Result<(Idx, SpecializedBody), TypeError> {
        let key = self.instances.get(id).key.clone();
        let (params, body) = {
            let def = &self.overloads.get(key.def).def;
            (def.params.clone(), def.body)
        };

        let self_class = key.receiver.and_then(|r| self.pool.instance_class(r));
        let mut frame = Frame::new(key.receiver, self_class);
        for (index, param) in params.iter().enumerate() {
            let ty = match key.args.get(index) {
                Some(&arg) => arg,
                None => self.infer_default(&mut frame, &key, index, param)?,
            };
            frame.locals.insert(param.name, ty);
        }

        let value = self.infer_expr(&mut frame, body)?;
        frame.body.param_types = params
            .iter()
            .map(|p| frame.local(p.name).unwrap_or(Idx::NIL))
            .collect();
        let result = self.pool.union(value, frame.returns);
        Ok((result, frame.body))
    }

    /// Type of an omitted argument: its default, evaluated in the callee
    /// frame after the earlier parameters are bound.
    fn infer_default(
        &mut self,
        frame: &mut Frame,
        key: &InstanceKey,
        index: usize,
        param: &Param,
    ) -> Result<Idx, TypeError> {
        let Some(default) = param.default else {
            return Ok(Idx::NIL);
        };
        let ty = self.infer_expr(frame, default)?;
        let restriction = self
            .overloads
            .get(key.def)
            .restriction(&mut self.pool, index, key.receiver);
        if let Some(restriction) = restriction {
            if !self.classes.is_subtype(&self.pool, ty, restriction) {
                return Err(TypeError::new(
                    TypeErrorKind::TypeRestrictionViolation {
                        method: self
                            .interner
                            .lookup(self.overloads.get(key.def).def.name)
                            .to_string(),
                        param: self.interner.lookup(param.name).to_string(),
                        expected: self.type_name(restriction),
                        found: self.type_name(ty),
                    },
                    self.module.arena.span(default),
                ));
            }
        }
        Ok(ty)
    }

    fn resolver(&mut self) -> CallResolver<'_> {
        CallResolver::new(
            &mut self.pool,
            &self.classes,
            &self.overloads,
            &self.names,
            self.interner,
        )
    }

    fn type_name(&self, ty: Idx) -> String {
        self.classes.type_name(&self.pool, ty, self.interner)
    }

    /// Hand over the registries and instantiations.
    pub(crate) fn into_parts(self) -> (Pool, ClassRegistry, OverloadRegistry, InstantiationManager) {
        (self.pool, self.classes, self.overloads, self.instances)
    }
}
