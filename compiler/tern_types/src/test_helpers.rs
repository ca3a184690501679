//! Shared fixtures for unit tests.

use tern_ir::{Module, ModuleBuilder, Name, StringInterner};
use tracing_subscriber::EnvFilter;

use crate::{check_module, check_module_with_config, DefId, Idx, InferConfig, TypeCheckResult};

/// Install a `fmt` subscriber filtered by `TERN_LOG`, once per process.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("TERN_LOG"))
        .with_test_writer()
        .try_init();
}

/// A module built on top of the prelude, with the interner it uses.
pub(crate) struct Program {
    pub interner: StringInterner,
    pub module: Module,
}

/// Build a program; the prelude is installed first.
pub(crate) fn program(build: impl FnOnce(&mut ModuleBuilder<'_>)) -> Program {
    init_tracing();
    let interner = StringInterner::new();
    let module = {
        let mut b = crate::prelude::builder(&interner);
        build(&mut b);
        b.finish()
    };
    Program { interner, module }
}

impl Program {
    pub fn check(&self) -> TypeCheckResult {
        check_module(&self.module, &self.interner)
    }

    pub fn check_with(&self, config: InferConfig) -> TypeCheckResult {
        check_module_with_config(&self.module, &self.interner, config)
    }

    /// Check and fail the test on any error.
    pub fn check_ok(&self) -> TypeCheckResult {
        let result = self.check();
        assert!(
            result.errors.is_empty(),
            "unexpected errors: {:?}",
            result
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        );
        result
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// The one definition called `name`.
    pub fn def(&self, result: &TypeCheckResult, name: &str) -> DefId {
        let defs = result.program.definitions_named(self.name(name));
        assert_eq!(defs.len(), 1, "expected exactly one `{name}`");
        defs[0]
    }

    /// Render a type.
    pub fn show(&self, result: &TypeCheckResult, ty: Idx) -> String {
        result.program.type_name(ty, &self.interner)
    }

    /// Rendered type of the last top-level statement.
    pub fn main_type(&self, result: &TypeCheckResult) -> String {
        self.show(result, result.program.main_type)
    }

    /// Rendered return types of every instantiation of `name`.
    pub fn return_types(&self, result: &TypeCheckResult, name: &str) -> Vec<String> {
        let def = self.def(result, name);
        result
            .program
            .instantiations_of(def)
            .map(|(_, inst)| self.show(result, inst.return_type))
            .collect()
    }
}
