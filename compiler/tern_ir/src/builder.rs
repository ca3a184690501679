//! Programmatic construction of [`Module`]s.
//!
//! The builder produces exactly the structure a parser would: it is how the
//! prelude is written and how tests express programs. Every node gets a
//! distinct synthetic span so diagnostics can still point at it.

use crate::{
    ClassDecl, Definition, ExprId, ExprKind, Intrinsic, Module, Name, Owner, Param, Span,
    StringInterner, TypeExpr,
};

/// Builder for a [`Module`].
///
/// ```text
/// // def foo(x = 1); x + 1; end; foo(2) + foo
/// let mut b = ModuleBuilder::new(&interner);
/// let x = b.var("x");
/// let one = b.int(1);
/// let body = b.call(x, "+", &[one]);
/// let default = b.int(1);
/// let param = b.param_default("x", default);
/// b.def("foo", vec![param], body);
/// ```
pub struct ModuleBuilder<'i> {
    interner: &'i StringInterner,
    module: Module,
    next_offset: u32,
}

impl<'i> ModuleBuilder<'i> {
    /// Create an empty builder.
    pub fn new(interner: &'i StringInterner) -> Self {
        ModuleBuilder {
            interner,
            module: Module::default(),
            next_offset: 0,
        }
    }

    /// The interner names are created with.
    pub fn interner(&self) -> &'i StringInterner {
        self.interner
    }

    /// Intern a name.
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn next_span(&mut self) -> Span {
        let start = self.next_offset;
        self.next_offset += 1;
        Span::new(start, start + 1)
    }

    fn alloc(&mut self, kind: ExprKind) -> ExprId {
        let span = self.next_span();
        self.module.arena.alloc(kind, span)
    }

    // === Literals ===

    pub fn nil(&mut self) -> ExprId {
        self.alloc(ExprKind::Nil)
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.alloc(ExprKind::Bool(value))
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.alloc(ExprKind::Int(value))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.alloc(ExprKind::Float(value))
    }

    pub fn self_ref(&mut self) -> ExprId {
        self.alloc(ExprKind::SelfRef)
    }

    // === Variables ===

    pub fn var(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::Var(name))
    }

    pub fn assign(&mut self, name: &str, value: ExprId) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::Assign { name, value })
    }

    /// `@name` (pass the name without the sigil).
    pub fn ivar(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::InstanceVar(name))
    }

    /// `@name = value` (pass the name without the sigil).
    pub fn ivar_assign(&mut self, name: &str, value: ExprId) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::InstanceVarAssign { name, value })
    }

    /// A class used as a value.
    pub fn constant(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::Const(name))
    }

    // === Calls ===

    /// `receiver.method(args)`
    pub fn call(&mut self, receiver: ExprId, method: &str, args: &[ExprId]) -> ExprId {
        let method = self.name(method);
        let args = self.module.arena.alloc_list(args);
        self.alloc(ExprKind::Call {
            receiver: Some(receiver),
            method,
            args,
        })
    }

    /// `method(args)` with an implicit receiver.
    pub fn call_self(&mut self, method: &str, args: &[ExprId]) -> ExprId {
        let method = self.name(method);
        let args = self.module.arena.alloc_list(args);
        self.alloc(ExprKind::Call {
            receiver: None,
            method,
            args,
        })
    }

    pub fn intrinsic(&mut self, op: Intrinsic, args: &[ExprId]) -> ExprId {
        let args = self.module.arena.alloc_list(args);
        self.alloc(ExprKind::Intrinsic { op, args })
    }

    // === Control flow ===

    pub fn if_(&mut self, cond: ExprId, then_branch: ExprId, else_branch: Option<ExprId>) -> ExprId {
        self.alloc(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn while_(&mut self, cond: ExprId, body: ExprId) -> ExprId {
        self.alloc(ExprKind::While { cond, body })
    }

    pub fn and(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.alloc(ExprKind::And { left, right })
    }

    pub fn or(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.alloc(ExprKind::Or { left, right })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> ExprId {
        self.alloc(ExprKind::Return(value))
    }

    pub fn block(&mut self, stmts: &[ExprId]) -> ExprId {
        let stmts = self.module.arena.alloc_list(stmts);
        self.alloc(ExprKind::Block(stmts))
    }

    // === Parameters and restrictions ===

    pub fn param(&mut self, name: &str) -> Param {
        Param {
            name: self.name(name),
            restriction: None,
            default: None,
            span: self.next_span(),
        }
    }

    pub fn param_restricted(&mut self, name: &str, restriction: TypeExpr) -> Param {
        Param {
            restriction: Some(restriction),
            ..self.param(name)
        }
    }

    pub fn param_default(&mut self, name: &str, default: ExprId) -> Param {
        Param {
            default: Some(default),
            ..self.param(name)
        }
    }

    /// `Name` restriction.
    pub fn named_type(&self, name: &str) -> TypeExpr {
        TypeExpr::Named(self.name(name))
    }

    // === Items ===

    /// Declare (or reopen) a class.
    pub fn class(&mut self, name: &str, superclass: Option<&str>) -> Name {
        let name = self.name(name);
        let superclass = superclass.map(|s| self.name(s));
        let span = self.next_span();
        self.module.classes.push(ClassDecl {
            name,
            superclass,
            span,
        });
        name
    }

    /// Free function.
    pub fn def(&mut self, name: &str, params: Vec<Param>, body: ExprId) -> &mut Self {
        self.push_definition(None, name, params, body)
    }

    /// Instance method on `class`.
    pub fn method(&mut self, class: &str, name: &str, params: Vec<Param>, body: ExprId) -> &mut Self {
        let owner = Owner::Instance(self.name(class));
        self.push_definition(Some(owner), name, params, body)
    }

    /// Metatype method `def Class.name`.
    pub fn class_method(
        &mut self,
        class: &str,
        name: &str,
        params: Vec<Param>,
        body: ExprId,
    ) -> &mut Self {
        let owner = Owner::Class(self.name(class));
        self.push_definition(Some(owner), name, params, body)
    }

    fn push_definition(
        &mut self,
        owner: Option<Owner>,
        name: &str,
        params: Vec<Param>,
        body: ExprId,
    ) -> &mut Self {
        let name = self.name(name);
        let span = self.next_span();
        self.module.definitions.push(Definition {
            name,
            owner,
            params,
            body,
            span,
        });
        self
    }

    /// Append a top-level statement.
    pub fn stmt(&mut self, expr: ExprId) -> &mut Self {
        self.module.main.push(expr);
        self
    }

    /// Finish building.
    pub fn finish(self) -> Module {
        self.module
    }
}
