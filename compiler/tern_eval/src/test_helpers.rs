//! Build, check and run small programs in tests.

use tern_ir::{ModuleBuilder, StringInterner};
use tern_types::{check_module, prelude};
use tracing_subscriber::EnvFilter;

use crate::{run_with_config, EvalConfig, EvalError, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("TERN_LOG"))
        .with_test_writer()
        .try_init();
}

/// Type-check a program built on the prelude, assert it is free of type
/// errors, and run it.
pub(crate) fn eval_with(
    config: EvalConfig,
    build: impl FnOnce(&mut ModuleBuilder<'_>),
) -> Result<Value, EvalError> {
    init_tracing();
    let interner = StringInterner::new();
    let module = {
        let mut b = prelude::builder(&interner);
        build(&mut b);
        b.finish()
    };
    let result = check_module(&module, &interner);
    assert!(
        !result.has_errors(),
        "unexpected type errors: {:?}",
        result
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    );
    run_with_config(&module, &interner, &result.program, config)
}

pub(crate) fn eval(build: impl FnOnce(&mut ModuleBuilder<'_>)) -> Result<Value, EvalError> {
    eval_with(EvalConfig::default(), build)
}
