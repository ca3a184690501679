//! Module-level entry point and the typed output handed to the emitter.

use tern_diagnostic::Diagnostic;
use tern_ir::{Module, Name, StringInterner};
use tracing::debug;

use crate::infer::InferEngine;
use crate::instantiate::{InstId, InstanceKey, Instantiation, SpecializedBody};
use crate::pool::Members;
use crate::{
    ClassId, ClassRegistry, DefId, Idx, InferConfig, InstantiationManager, OverloadRegistry,
    Pool, TypeError,
};

/// A fully inferred program.
///
/// Every instantiation is finalized: its body, dispatch tables and return
/// type no longer change.
pub struct TypedProgram {
    pub pool: Pool,
    pub classes: ClassRegistry,
    pub overloads: OverloadRegistry,
    pub instances: InstantiationManager,
    /// The top-level statements as one unit.
    pub main: SpecializedBody,
    /// Type of the last top-level statement.
    pub main_type: Idx,
    /// Whole-program passes run.
    pub passes: u32,
}

impl TypedProgram {
    /// The compilation units: every finalized instantiation.
    pub fn units(&self) -> impl Iterator<Item = (InstId, &Instantiation)> {
        self.instances.iter()
    }

    pub fn instantiations_of(&self, def: DefId) -> impl Iterator<Item = (InstId, &Instantiation)> {
        self.instances.of_definition(def)
    }

    /// Definitions named `name` on any owner, in registration order.
    pub fn definitions_named(&self, name: Name) -> Vec<DefId> {
        self.overloads
            .iter()
            .filter(|entry| entry.def.name == name)
            .map(|entry| entry.id)
            .collect()
    }

    /// Return type of the instantiation for exactly this key.
    pub fn return_type(&self, def: DefId, receiver: Option<Idx>, args: &[Idx]) -> Option<Idx> {
        let key = InstanceKey {
            def,
            receiver,
            args: args.iter().copied().collect::<Members>(),
        };
        self.instances
            .lookup(&key)
            .map(|id| self.instances.get(id).return_type)
    }

    /// Per-parameter union of the final parameter types over every
    /// instantiation of `def`.
    pub fn parameter_types(&mut self, def: DefId) -> Vec<Idx> {
        let arity = self.overloads.get(def).def.params.len();
        let mut out = vec![Idx::NEVER; arity];
        for (_, inst) in self.instances.of_definition(def) {
            for (slot, &ty) in out.iter_mut().zip(&inst.body.param_types) {
                *slot = self.pool.union(*slot, ty);
            }
        }
        out
    }

    pub fn class_named(&self, name: Name) -> Option<ClassId> {
        self.classes.lookup(name)
    }

    pub fn type_name(&self, ty: Idx, interner: &StringInterner) -> String {
        self.classes.type_name(&self.pool, ty, interner)
    }
}

/// Result of checking a module.
pub struct TypeCheckResult {
    pub program: TypedProgram,
    pub errors: Vec<TypeError>,
}

impl TypeCheckResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.iter().map(TypeError::to_diagnostic).collect()
    }
}

/// Type-check a module with default limits.
pub fn check_module(module: &Module, interner: &StringInterner) -> TypeCheckResult {
    check_module_with_config(module, interner, InferConfig::default())
}

/// Type-check a module.
pub fn check_module_with_config(
    module: &Module,
    interner: &StringInterner,
    config: InferConfig,
) -> TypeCheckResult {
    InferEngine::new(module, interner, config).check()
}

impl InferEngine<'_> {
    /// Register, infer and finalize.
    ///
    /// Registration errors do not stop inference: definitions that
    /// registered are still inferred so independent errors surface in one
    /// batch.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn check(mut self) -> TypeCheckResult {
        let mut errors = self.register();
        let inferred = self.infer();
        errors.extend(inferred.errors);

        let (pool, classes, overloads, instances) = self.into_parts();
        debug!(
            passes = inferred.passes,
            instances = instances.len(),
            errors = errors.len(),
            "type check complete"
        );
        TypeCheckResult {
            program: TypedProgram {
                pool,
                classes,
                overloads,
                instances,
                main: inferred.main,
                main_type: inferred.main_type,
                passes: inferred.passes,
            },
            errors,
        }
    }
}
