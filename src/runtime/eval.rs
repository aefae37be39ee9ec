//! Expression evaluation and calls.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use scriptbox_core::errors::{ErrorKind, RECURSION_LIMIT_MSG};
use scriptbox_core::lang::errors as exc_registry;
use scriptbox_syntax::ast::{
    BinaryOp, CallArg, CompClause, CompareOp, DictComp, Expr, FStringPart, ListComp, Literal, Param, SliceExpr, Spanned,
    UnaryOp,
};

use super::Interpreter;
use super::dict::Dict;
use super::exceptions::{EvalResult, ExceptionObj, fail, type_error};
use super::object::{Function, FunctionBody, Object};
use super::scope::{self, Env};
use super::{methods, ops, repr};

/// Evaluated call arguments.
#[derive(Debug, Default)]
pub(super) struct Args {
    pub positional: Vec<Object>,
    pub keywords: Vec<(String, Object)>,
}

impl Args {
    pub fn positional(items: Vec<Object>) -> Self {
        Self {
            positional: items,
            keywords: Vec::new(),
        }
    }

    /// Remove and return keyword argument `name`.
    pub fn take_keyword(&mut self, name: &str) -> Option<Object> {
        let pos = self.keywords.iter().position(|(k, _)| k == name)?;
        Some(self.keywords.remove(pos).1)
    }

    /// Fail if the callee was given keyword arguments at all.
    pub fn no_keywords(&self, callee: &str) -> EvalResult<()> {
        if self.keywords.is_empty() {
            Ok(())
        } else {
            type_error(format!("{callee}() takes no keyword arguments"))
        }
    }

    /// Fail on keyword arguments left over after the supported ones were taken.
    pub fn no_unexpected_keywords(&self, callee: &str) -> EvalResult<()> {
        match self.keywords.first() {
            None => Ok(()),
            Some((name, _)) => type_error(format!("'{name}' is an invalid keyword argument for {callee}()")),
        }
    }

    /// Check the positional count against `min..=max`.
    pub fn arity(&self, callee: &str, min: usize, max: usize) -> EvalResult<()> {
        let n = self.positional.len();
        if (min..=max).contains(&n) {
            return Ok(());
        }
        let plural = |k: usize| if k == 1 { "" } else { "s" };
        let message = if min == max {
            if min == 1 {
                format!("{callee}() takes exactly one argument ({n} given)")
            } else {
                format!("{callee} expected {min} argument{}, got {n}", plural(min))
            }
        } else if n < min {
            format!("{callee} expected at least {min} argument{}, got {n}", plural(min))
        } else {
            format!("{callee} expected at most {max} argument{}, got {n}", plural(max))
        };
        type_error(message)
    }
}

fn literal(lit: &Literal) -> Object {
    match lit {
        Literal::Int(i) => Object::Int(*i),
        Literal::Float(f) => Object::Float(*f),
        Literal::String(s) => Object::str(s),
        Literal::Bool(b) => Object::Bool(*b),
        Literal::None => Object::None,
    }
}

impl Interpreter<'_> {
    pub(super) fn eval(&mut self, expr: &Spanned<Expr>) -> EvalResult {
        self.nested(|this| this.eval_node(&expr.node))
            .map_err(|unwind| unwind.at(expr.span))
    }

    fn eval_node(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Ident(name) => self.lookup(name),
            Expr::Literal(lit) => Ok(literal(lit)),
            Expr::Binary(left, op, right) => self.eval_binary(left, *op, right),
            Expr::Unary(op, operand) => self.eval_unary(*op, operand),
            Expr::Compare(first, rest) => self.eval_compare(first, rest),
            Expr::Call(callee, args) => {
                let callee = self.eval(callee)?;
                let args = self.eval_args(args)?;
                self.call_object(&callee, args)
            }
            Expr::MethodCall(receiver, name, args) => {
                let receiver = self.eval(receiver)?;
                let args = self.eval_args(args)?;
                if methods::has_method(&receiver, name) {
                    self.call_method(&receiver, name, args)
                } else {
                    let attr = methods::get_attr(&receiver, name)?;
                    self.call_object(&attr, args)
                }
            }
            Expr::Field(object, name) => {
                let object = self.eval(object)?;
                methods::get_attr(&object, name)
            }
            Expr::Index(object, index) => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                ops::get_item(&object, &index)
            }
            Expr::Slice(object, slice) => self.eval_slice(object, slice),
            Expr::IfExp(e) => {
                if self.eval(&e.condition)?.truthy() {
                    self.eval(&e.then)
                } else {
                    self.eval(&e.otherwise)
                }
            }
            Expr::Lambda(params, body) => {
                let function = self.make_function("<lambda>", params, FunctionBody::Lambda(Rc::new((**body).clone())))?;
                Ok(Object::Function(Rc::new(function)))
            }
            Expr::Tuple(items) => Ok(Object::tuple(self.eval_all(items)?)),
            Expr::List(items) => Ok(Object::list(self.eval_all(items)?)),
            Expr::Dict(pairs) => {
                let mut dict = Dict::new();
                for (k, v) in pairs {
                    let key = self.eval(k)?;
                    let value = self.eval(v)?;
                    let hashed = ops::hash_key(&key).map_err(|u| u.at(k.span))?;
                    dict.insert(hashed, key, value);
                }
                Ok(Object::dict(dict))
            }
            Expr::ListComp(comp) => self.eval_list_comp(comp),
            Expr::DictComp(comp) => self.eval_dict_comp(comp),
            Expr::Paren(inner) => self.eval(inner),
            Expr::FString(parts) => self.eval_fstring(parts),
        }
    }

    fn eval_all(&mut self, items: &[Spanned<Expr>]) -> EvalResult<Vec<Object>> {
        items.iter().map(|item| self.eval(item)).collect()
    }

    fn eval_binary(&mut self, left: &Spanned<Expr>, op: BinaryOp, right: &Spanned<Expr>) -> EvalResult {
        let lhs = self.eval(left)?;
        match op {
            BinaryOp::And if !lhs.truthy() => Ok(lhs),
            BinaryOp::Or if lhs.truthy() => Ok(lhs),
            BinaryOp::And | BinaryOp::Or => self.eval(right),
            _ => {
                let rhs = self.eval(right)?;
                ops::binary(op, &lhs, &rhs)
            }
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Spanned<Expr>) -> EvalResult {
        let value = self.eval(operand)?;
        match op {
            UnaryOp::Not => Ok(Object::Bool(!value.truthy())),
            UnaryOp::Neg => ops::negate(&value, true),
            UnaryOp::Pos => ops::negate(&value, false),
        }
    }

    /// `a < b < c` evaluates each operand at most once and stops at the first false link.
    fn eval_compare(&mut self, first: &Spanned<Expr>, rest: &[(CompareOp, Spanned<Expr>)]) -> EvalResult {
        let mut left = self.eval(first)?;
        for (op, right) in rest {
            let right_value = self.eval(right)?;
            if !ops::compare(*op, &left, &right_value)? {
                return Ok(Object::Bool(false));
            }
            left = right_value;
        }
        Ok(Object::Bool(true))
    }

    fn eval_slice(&mut self, object: &Spanned<Expr>, slice: &SliceExpr) -> EvalResult {
        let object = self.eval(object)?;
        let start = self.slice_bound(slice.start.as_deref())?;
        let end = self.slice_bound(slice.end.as_deref())?;
        let step = self.slice_bound(slice.step.as_deref())?;
        ops::get_slice(&object, start, end, step)
    }

    fn slice_bound(&mut self, bound: Option<&Spanned<Expr>>) -> EvalResult<Option<i64>> {
        let Some(bound) = bound else {
            return Ok(None);
        };
        match self.eval(bound)? {
            Object::None => Ok(None),
            value => match ops::as_index(&value) {
                Some(i) => Ok(Some(i)),
                None => type_error("slice indices must be integers or None or have an __index__ method")
                    .map_err(|u| u.at(bound.span)),
            },
        }
    }

    fn eval_fstring(&mut self, parts: &[FStringPart]) -> EvalResult {
        let mut out = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(text) => out.push_str(text),
                FStringPart::Expr(field) => {
                    let value = self.eval(&field.expr)?;
                    let value = match field.conversion {
                        Some('r') => Object::string(repr::repr(&value)),
                        Some('a') => Object::string(repr::ascii(&value)),
                        Some('s') => Object::string(repr::to_str(&value)),
                        _ => value,
                    };
                    let rendered = match &field.spec {
                        Some(spec) => repr::format_value(&value, spec).map_err(|u| u.at(field.expr.span))?,
                        None => repr::to_str(&value),
                    };
                    out.push_str(&rendered);
                }
            }
        }
        Ok(Object::string(out))
    }

    // ------------------------------------------------------------------
    // Comprehensions
    // ------------------------------------------------------------------

    /// Run `body` once per item of the comprehension's iterable, inside the comprehension's own scope.
    fn comprehend(
        &mut self,
        clause: &CompClause,
        mut body: impl FnMut(&mut Self) -> EvalResult<()>,
    ) -> EvalResult<()> {
        // The first iterable is evaluated in the enclosing scope.
        let iterable = self.eval(&clause.iter)?;
        let items = ops::Cursor::over(&iterable).map_err(|u| u.at(clause.iter.span))?;
        let mut names = HashSet::new();
        scope::collect_target(&clause.target.node, &mut names);
        let env = Rc::new(Env::new(
            HashMap::new(),
            Rc::new(names),
            Rc::new(HashSet::new()),
            self.env.clone(),
        ));
        let saved = self.env.replace(env);
        let result = self.comprehension_loop(clause, items, &mut body);
        self.env = saved;
        result
    }

    fn comprehension_loop(
        &mut self,
        clause: &CompClause,
        items: ops::Cursor,
        body: &mut impl FnMut(&mut Self) -> EvalResult<()>,
    ) -> EvalResult<()> {
        'items: for item in items {
            self.tick()?;
            self.assign_target(&clause.target, item)?;
            for filter in &clause.filters {
                if !self.eval(filter)?.truthy() {
                    continue 'items;
                }
            }
            body(self)?;
        }
        Ok(())
    }

    fn eval_list_comp(&mut self, comp: &ListComp) -> EvalResult {
        let mut out = Vec::new();
        self.comprehend(&comp.clause, |interp| {
            out.push(interp.eval(&comp.expr)?);
            Ok(())
        })?;
        Ok(Object::list(out))
    }

    fn eval_dict_comp(&mut self, comp: &DictComp) -> EvalResult {
        let mut dict = Dict::new();
        self.comprehend(&comp.clause, |interp| {
            let key = interp.eval(&comp.key)?;
            let value = interp.eval(&comp.value)?;
            let hashed = ops::hash_key(&key).map_err(|u| u.at(comp.key.span))?;
            dict.insert(hashed, key, value);
            Ok(())
        })?;
        Ok(Object::dict(dict))
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    fn eval_args(&mut self, args: &[CallArg]) -> EvalResult<Args> {
        let mut out = Args::default();
        for arg in args {
            match arg {
                CallArg::Positional(expr) => out.positional.push(self.eval(expr)?),
                CallArg::Named(name, expr) => {
                    let value = self.eval(expr)?;
                    if out.keywords.iter().any(|(k, _)| k == name) {
                        return fail(ErrorKind::TypeError, format!("keyword argument repeated: {name}"))
                            .map_err(|u| u.at(expr.span));
                    }
                    out.keywords.push((name.clone(), value));
                }
            }
        }
        Ok(out)
    }

    /// Build a function object; defaults are evaluated now, in the defining scope.
    pub(super) fn make_function(&mut self, name: &str, params: &[Spanned<Param>], body: FunctionBody) -> EvalResult<Function> {
        let mut bound = Vec::with_capacity(params.len());
        for param in params {
            let default = match &param.node.default {
                Some(expr) => Some(self.eval(expr)?),
                None => None,
            };
            bound.push((Rc::from(param.node.name.as_str()), default));
        }
        let names: Vec<&str> = params.iter().map(|p| p.node.name.as_str()).collect();
        let (locals, globals_declared) = match &body {
            FunctionBody::Block(stmts) => scope::analyze_body(&names, stmts),
            FunctionBody::Lambda(_) => (names.iter().map(|n| n.to_string()).collect(), HashSet::new()),
        };
        Ok(Function {
            name: Rc::from(name),
            params: bound,
            body,
            locals: Rc::new(locals),
            globals_declared: Rc::new(globals_declared),
            closure: self.env.clone(),
        })
    }

    pub(super) fn call_object(&mut self, callee: &Object, args: Args) -> EvalResult {
        match callee {
            Object::Function(f) => self.call_function(f, args),
            Object::Builtin(id) => self.call_builtin(*id, args),
            Object::BoundMethod(m) => self.call_method(&m.0, &m.1, args),
            Object::ExceptionType(kind) => {
                if !args.keywords.is_empty() {
                    return type_error(format!("{}() takes no keyword arguments", exc_registry::as_str(*kind)));
                }
                Ok(Object::Exception(Rc::new(ExceptionObj::new(*kind, args.positional))))
            }
            Object::Type(tag) => type_error(format!("cannot create '{}' instances", tag.name())),
            other => type_error(format!("'{}' object is not callable", other.type_name())),
        }
    }

    fn call_function(&mut self, f: &Rc<Function>, args: Args) -> EvalResult {
        if self.depth >= self.config.max_call_depth {
            return fail(ErrorKind::RecursionError, RECURSION_LIMIT_MSG);
        }
        let vars = bind_params(f, args)?;
        let env = Rc::new(Env::new(vars, f.locals.clone(), f.globals_declared.clone(), f.closure.clone()));
        let saved = self.env.replace(env);
        self.depth += 1;
        tracing::trace!(function = %f.name, depth = self.depth, "call");
        let result = match &f.body {
            FunctionBody::Block(body) => self.exec_block(body).map(|flow| match flow {
                super::exceptions::Flow::Return(value) => value,
                _ => Object::None,
            }),
            FunctionBody::Lambda(expr) => self.eval(expr),
        };
        self.depth -= 1;
        self.env = saved;
        result
    }
}

/// Match call arguments to parameters, Python style.
fn bind_params(f: &Function, mut args: Args) -> EvalResult<HashMap<String, Object>> {
    let name = &f.name;
    let total = f.params.len();
    let given = args.positional.len();
    if given > total {
        let required = f.params.iter().filter(|(_, d)| d.is_none()).count();
        let takes = if required == total {
            format!("{total} positional argument{}", if total == 1 { "" } else { "s" })
        } else {
            format!("from {required} to {total} positional arguments")
        };
        let was = if given == 1 { "was" } else { "were" };
        return type_error(format!("{name}() takes {takes} but {given} {was} given"));
    }

    let mut vars = HashMap::with_capacity(total);
    for ((param, _), value) in f.params.iter().zip(args.positional.drain(..)) {
        vars.insert(param.to_string(), value);
    }
    for (key, value) in args.keywords {
        if !f.params.iter().any(|(p, _)| **p == *key) {
            return type_error(format!("{name}() got an unexpected keyword argument '{key}'"));
        }
        if vars.contains_key(&key) {
            return type_error(format!("{name}() got multiple values for argument '{key}'"));
        }
        vars.insert(key, value);
    }

    let mut missing = Vec::new();
    for (param, default) in &f.params {
        if vars.contains_key(&**param) {
            continue;
        }
        match default {
            Some(value) => {
                vars.insert(param.to_string(), value.clone());
            }
            None => missing.push(format!("'{param}'")),
        }
    }
    if !missing.is_empty() {
        let count = missing.len();
        let listed = match missing.as_slice() {
            [one] => one.clone(),
            [a, b] => format!("{a} and {b}"),
            [init @ .., last] => format!("{}, and {last}", init.join(", ")),
            [] => String::new(),
        };
        return type_error(format!(
            "{name}() missing {count} required positional argument{}: {listed}",
            if count == 1 { "" } else { "s" }
        ));
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(params: &[(&str, Option<Object>)]) -> Function {
        Function {
            name: Rc::from("f"),
            params: params.iter().map(|(n, d)| (Rc::from(*n), d.clone())).collect(),
            body: FunctionBody::Block(Rc::from(Vec::new())),
            locals: Rc::new(HashSet::new()),
            globals_declared: Rc::new(HashSet::new()),
            closure: None,
        }
    }

    fn message(result: EvalResult<HashMap<String, Object>>) -> String {
        match result {
            Err(super::super::exceptions::Unwind::Raise(e)) => e.message(),
            other => panic!("expected a TypeError, got {other:?}"),
        }
    }

    #[test]
    fn arguments_bind_positionally_then_by_keyword() {
        let f = function(&[("a", None), ("b", Some(Object::Int(2)))]);
        let vars = bind_params(&f, Args::positional(vec![Object::Int(1)])).unwrap();
        assert!(matches!(vars.get("b"), Some(Object::Int(2))));

        let mut args = Args::positional(vec![]);
        args.keywords.push(("b".into(), Object::Int(5)));
        args.keywords.push(("a".into(), Object::Int(4)));
        let vars = bind_params(&f, args).unwrap();
        assert!(matches!(vars.get("a"), Some(Object::Int(4))));
        assert!(matches!(vars.get("b"), Some(Object::Int(5))));
    }

    #[test]
    fn arity_errors_use_python_wording() {
        let f = function(&[("a", None), ("b", None), ("c", None)]);
        assert_eq!(
            message(bind_params(&f, Args::positional(vec![Object::Int(1)]))),
            "f() missing 2 required positional arguments: 'b' and 'c'"
        );
        assert_eq!(
            message(bind_params(&f, Args::positional(vec![Object::None; 4]))),
            "f() takes 3 positional arguments but 4 were given"
        );
        let g = function(&[("a", None), ("b", Some(Object::None))]);
        assert_eq!(
            message(bind_params(&g, Args::positional(vec![Object::None; 3]))),
            "f() takes from 1 to 2 positional arguments but 3 were given"
        );
        let mut args = Args::positional(vec![Object::None]);
        args.keywords.push(("a".into(), Object::None));
        assert_eq!(message(bind_params(&g, args)), "f() got multiple values for argument 'a'");
    }
}
