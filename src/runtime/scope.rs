//! Function scopes and local-name analysis.
//!
//! Like Python, whether a name is local to a function is decided from the function body before it runs: any name
//! the body assigns (and does not declare `global`) is local for the whole body. Reading such a name before it is
//! assigned is an error even if a global of the same name exists.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use scriptbox_syntax::ast::{Spanned, Statement, Target};

use super::object::Object;

/// One activation of a function, lambda or comprehension.
pub(crate) struct Env {
    vars: RefCell<HashMap<String, Object>>,
    pub locals: Rc<HashSet<String>>,
    pub globals_declared: Rc<HashSet<String>>,
    pub parent: Option<Rc<Env>>,
}

impl Env {
    pub fn new(
        vars: HashMap<String, Object>,
        locals: Rc<HashSet<String>>,
        globals_declared: Rc<HashSet<String>>,
        parent: Option<Rc<Env>>,
    ) -> Self {
        Self {
            vars: RefCell::new(vars),
            locals,
            globals_declared,
            parent,
        }
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        self.vars.borrow().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: Object) {
        self.vars.borrow_mut().insert(name.to_string(), value);
    }

    pub fn remove(&self, name: &str) -> Option<Object> {
        self.vars.borrow_mut().remove(name)
    }
}

/// Where a name resolves from inside a scope chain.
pub(crate) enum Resolved {
    Found(Object),
    /// Local to the innermost scope but not assigned yet.
    UnboundLocal,
    /// Local to an enclosing function but not assigned yet.
    UnboundFree,
    /// Not bound by any function scope: look in globals, then builtins.
    Global,
}

/// Resolve `name` through `env` and its enclosing scopes.
pub(crate) fn resolve(env: &Rc<Env>, name: &str) -> Resolved {
    let mut current = Some(env);
    let mut innermost = true;
    while let Some(scope) = current {
        if scope.globals_declared.contains(name) {
            return Resolved::Global;
        }
        if let Some(v) = scope.get(name) {
            return Resolved::Found(v);
        }
        if scope.locals.contains(name) {
            return if innermost {
                Resolved::UnboundLocal
            } else {
                Resolved::UnboundFree
            };
        }
        innermost = false;
        current = scope.parent.as_ref();
    }
    Resolved::Global
}

/// Names a function body binds, and the names it declares `global`.
pub(crate) fn analyze_body(params: &[&str], body: &[Spanned<Statement>]) -> (HashSet<String>, HashSet<String>) {
    let mut locals: HashSet<String> = params.iter().map(|p| p.to_string()).collect();
    let mut globals = HashSet::new();
    collect_block(body, &mut locals, &mut globals);
    for g in &globals {
        locals.remove(g);
    }
    (locals, globals)
}

fn collect_block(body: &[Spanned<Statement>], locals: &mut HashSet<String>, globals: &mut HashSet<String>) {
    for stmt in body {
        match &stmt.node {
            Statement::Assign(a) => {
                for t in &a.targets {
                    collect_target(&t.node, locals);
                }
            }
            Statement::AugAssign(a) => collect_target(&a.target.node, locals),
            Statement::For(f) => {
                collect_target(&f.target.node, locals);
                collect_block(&f.body, locals, globals);
                if let Some(b) = &f.else_body {
                    collect_block(b, locals, globals);
                }
            }
            Statement::While(w) => {
                collect_block(&w.body, locals, globals);
                if let Some(b) = &w.else_body {
                    collect_block(b, locals, globals);
                }
            }
            Statement::If(i) => {
                collect_block(&i.then_body, locals, globals);
                for (_, b) in &i.elif_branches {
                    collect_block(b, locals, globals);
                }
                if let Some(b) = &i.else_body {
                    collect_block(b, locals, globals);
                }
            }
            Statement::Try(t) => {
                collect_block(&t.body, locals, globals);
                for h in &t.handlers {
                    if let Some(name) = &h.node.name {
                        locals.insert(name.clone());
                    }
                    collect_block(&h.node.body, locals, globals);
                }
                for b in [&t.else_body, &t.finally_body].into_iter().flatten() {
                    collect_block(b, locals, globals);
                }
            }
            // Nested bodies have their own scope; only the name is bound here.
            Statement::FunctionDef(f) => {
                locals.insert(f.name.clone());
            }
            Statement::Del(targets) => {
                for t in targets {
                    collect_target(&t.node, locals);
                }
            }
            Statement::Global(names) => globals.extend(names.iter().cloned()),
            Statement::Expr(_)
            | Statement::Pass
            | Statement::Break
            | Statement::Continue
            | Statement::Return(_)
            | Statement::Assert(_)
            | Statement::Raise(_)
            | Statement::Import(_) => {}
        }
    }
}

pub(crate) fn collect_target(target: &Target, names: &mut HashSet<String>) {
    match target {
        Target::Name(n) => {
            names.insert(n.clone());
        }
        Target::Tuple(items) => {
            for t in items {
                collect_target(&t.node, names);
            }
        }
        Target::Index(..) => {}
    }
}
