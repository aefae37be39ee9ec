//! Statement execution.

use std::rc::Rc;

use scriptbox_core::errors::ErrorKind;
use scriptbox_core::lang::errors as exc_registry;
use scriptbox_syntax::ast::{
    AugAssignStmt, BinaryOp, ExceptHandler, ForStmt, RaiseStmt, Spanned, Statement, Target, TryStmt, WhileStmt,
};

use super::Interpreter;
use super::exceptions::{EvalResult, Exc, ExceptionObj, Flow, Unwind, fail, type_error, value_error};
use super::object::{FunctionBody, Object};
use super::ops;

impl Interpreter<'_> {
    pub(super) fn exec_block(&mut self, body: &[Spanned<Statement>]) -> EvalResult<Flow> {
        for stmt in body {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Spanned<Statement>) -> EvalResult<Flow> {
        self.tick().map_err(|u| u.at(stmt.span))?;
        self.nested(|this| this.exec_node(&stmt.node)).map_err(|u| u.at(stmt.span))
    }

    fn exec_node(&mut self, stmt: &Statement) -> EvalResult<Flow> {
        match stmt {
            Statement::Expr(expr) => {
                self.eval(expr)?;
            }
            Statement::Assign(assign) => {
                let value = self.eval(&assign.value)?;
                for target in &assign.targets {
                    self.assign_target(target, value.clone())?;
                }
            }
            Statement::AugAssign(aug) => self.exec_aug_assign(aug)?,
            Statement::If(stmt) => {
                if self.eval(&stmt.condition)?.truthy() {
                    return self.exec_block(&stmt.then_body);
                }
                for (condition, body) in &stmt.elif_branches {
                    if self.eval(condition)?.truthy() {
                        return self.exec_block(body);
                    }
                }
                if let Some(body) = &stmt.else_body {
                    return self.exec_block(body);
                }
            }
            Statement::While(stmt) => return self.exec_while(stmt),
            Statement::For(stmt) => return self.exec_for(stmt),
            Statement::Pass | Statement::Global(_) => {}
            Statement::Break => return Ok(Flow::Break),
            Statement::Continue => return Ok(Flow::Continue),
            Statement::FunctionDef(def) => {
                let function = self.make_function(&def.name, &def.params, FunctionBody::Block(Rc::from(def.body.clone())))?;
                self.assign_name(&def.name, Object::Function(Rc::new(function)));
            }
            Statement::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Object::None,
                };
                return Ok(Flow::Return(value));
            }
            Statement::Assert(assert) => {
                if !self.eval(&assert.test)?.truthy() {
                    let args = match &assert.msg {
                        Some(msg) => vec![self.eval(msg)?],
                        None => Vec::new(),
                    };
                    return Err(Unwind::Raise(Rc::new(ExceptionObj::new(ErrorKind::AssertionError, args))));
                }
            }
            Statement::Raise(raise) => return Err(self.exec_raise(raise)?),
            Statement::Try(stmt) => return self.exec_try(stmt),
            Statement::Del(targets) => {
                for target in targets {
                    self.delete_target(target)?;
                }
            }
            Statement::Import(import) => {
                let module = import.module.split('.').next().unwrap_or_default();
                return fail(ErrorKind::ImportError, format!("No module named '{module}'"));
            }
        }
        Ok(Flow::Normal)
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    pub(super) fn assign_target(&mut self, target: &Spanned<Target>, value: Object) -> EvalResult<()> {
        match &target.node {
            Target::Name(name) => {
                self.assign_name(name, value);
                Ok(())
            }
            Target::Index(object, index) => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                ops::set_item(&object, &index, value).map_err(|u| u.at(target.span))
            }
            Target::Tuple(targets) => {
                let items = unpack(&value, targets.len()).map_err(|u| u.at(target.span))?;
                for (target, item) in targets.iter().zip(items) {
                    self.assign_target(target, item)?;
                }
                Ok(())
            }
        }
    }

    fn exec_aug_assign(&mut self, aug: &AugAssignStmt) -> EvalResult<()> {
        match &aug.target.node {
            Target::Name(name) => {
                let current = self.lookup(name).map_err(|u| u.at(aug.target.span))?;
                let rhs = self.eval(&aug.value)?;
                let updated = in_place(aug.op, current, &rhs)?;
                self.assign_name(name, updated);
                Ok(())
            }
            Target::Index(object, index) => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                let current = ops::get_item(&object, &index).map_err(|u| u.at(aug.target.span))?;
                let rhs = self.eval(&aug.value)?;
                let updated = in_place(aug.op, current, &rhs)?;
                ops::set_item(&object, &index, updated).map_err(|u| u.at(aug.target.span))
            }
            // Rejected by the parser.
            Target::Tuple(_) => fail(ErrorKind::InternalError, "augmented assignment to a tuple target"),
        }
    }

    fn delete_target(&mut self, target: &Spanned<Target>) -> EvalResult<()> {
        let result = match &target.node {
            Target::Name(name) => self.delete_name(name),
            Target::Index(object, index) => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                ops::del_item(&object, &index)
            }
            Target::Tuple(targets) => targets.iter().try_for_each(|t| self.delete_target(t)),
        };
        result.map_err(|u| u.at(target.span))
    }

    // ------------------------------------------------------------------
    // Loops
    // ------------------------------------------------------------------

    fn exec_while(&mut self, stmt: &WhileStmt) -> EvalResult<Flow> {
        loop {
            self.tick()?;
            if !self.eval(&stmt.condition)?.truthy() {
                break;
            }
            match self.exec_block(&stmt.body)? {
                Flow::Break => return Ok(Flow::Normal),
                Flow::Normal | Flow::Continue => {}
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        match &stmt.else_body {
            Some(body) => self.exec_block(body),
            None => Ok(Flow::Normal),
        }
    }

    fn exec_for(&mut self, stmt: &ForStmt) -> EvalResult<Flow> {
        let iterable = self.eval(&stmt.iter)?;
        let cursor = ops::Cursor::over(&iterable).map_err(|u| u.at(stmt.iter.span))?;
        for item in cursor {
            self.tick()?;
            self.assign_target(&stmt.target, item)?;
            match self.exec_block(&stmt.body)? {
                Flow::Break => return Ok(Flow::Normal),
                Flow::Normal | Flow::Continue => {}
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        match &stmt.else_body {
            Some(body) => self.exec_block(body),
            None => Ok(Flow::Normal),
        }
    }

    // ------------------------------------------------------------------
    // Exceptions
    // ------------------------------------------------------------------

    /// Evaluate a `raise` statement into the unwind it starts.
    fn exec_raise(&mut self, raise: &RaiseStmt) -> EvalResult<Unwind> {
        let Some(expr) = &raise.exc else {
            return match self.handling.last() {
                Some(exc) => Ok(Unwind::Raise(exc.clone())),
                None => fail(ErrorKind::RuntimeError, "No active exception to reraise"),
            };
        };
        let exc = self.eval(expr)?;
        let exc = instantiate(exc).map_err(|u| u.at(expr.span))?;
        if let Some(cause_expr) = &raise.cause {
            let cause = match self.eval(cause_expr)? {
                Object::None => None,
                other => match instantiate(other) {
                    Ok(cause) => Some(Object::Exception(cause)),
                    Err(_) => {
                        return type_error("exception causes must derive from BaseException")
                            .map_err(|u| u.at(cause_expr.span));
                    }
                },
            };
            *exc.cause.borrow_mut() = cause;
        }
        Ok(Unwind::Raise(exc))
    }

    fn exec_try(&mut self, stmt: &TryStmt) -> EvalResult<Flow> {
        let outcome = match self.exec_block(&stmt.body) {
            Ok(Flow::Normal) => match &stmt.else_body {
                Some(body) => self.exec_block(body),
                None => Ok(Flow::Normal),
            },
            Ok(flow) => Ok(flow),
            Err(Unwind::Raise(exc)) => self.handle(&stmt.handlers, exc),
            // Engine interrupts unwind straight through handlers and `finally`.
            Err(interrupt @ Unwind::Interrupt(..)) => return Err(interrupt),
        };
        if matches!(outcome, Err(Unwind::Interrupt(..))) {
            return outcome;
        }
        let Some(finally) = &stmt.finally_body else {
            return outcome;
        };
        // A `finally` that raises or leaves the block overrides the pending outcome.
        match self.exec_block(finally)? {
            Flow::Normal => outcome,
            flow => Ok(flow),
        }
    }

    fn handle(&mut self, handlers: &[Spanned<ExceptHandler>], exc: Exc) -> EvalResult<Flow> {
        for handler in handlers {
            if !self.handler_matches(&handler.node, &exc)? {
                continue;
            }
            if let Some(name) = &handler.node.name {
                self.assign_name(name, Object::Exception(exc.clone()));
            }
            self.handling.push(exc.clone());
            let result = self.exec_block(&handler.node.body);
            self.handling.pop();
            if let Some(name) = &handler.node.name {
                // The handler may have deleted or rebound the name itself.
                let _ = self.delete_name(name);
            }
            return result;
        }
        Err(Unwind::Raise(exc))
    }

    fn handler_matches(&mut self, handler: &ExceptHandler, exc: &Exc) -> EvalResult<bool> {
        let Some(expr) = &handler.exc_type else {
            return Ok(true);
        };
        let filter = self.eval(expr)?;
        exception_matches(&filter, exc).map_err(|u| u.at(expr.span))
    }
}

/// Items for an unpacking assignment of `expected` targets.
fn unpack(value: &Object, expected: usize) -> EvalResult<Vec<Object>> {
    let items = match value {
        Object::List(_) | Object::Tuple(_) | Object::Str(_) | Object::Dict(_) | Object::Range(_) => ops::iterate(value)?,
        other => return type_error(format!("cannot unpack non-iterable {} object", other.type_name())),
    };
    match items.len() {
        n if n == expected => Ok(items),
        n if n > expected => value_error(format!("too many values to unpack (expected {expected})")),
        n => value_error(format!("not enough values to unpack (expected {expected}, got {n})")),
    }
}

/// `target op= value`: lists extend in place, everything else rebinds.
fn in_place(op: BinaryOp, current: Object, rhs: &Object) -> EvalResult {
    match (op, &current) {
        (BinaryOp::Add, Object::List(list)) => {
            let extra = ops::iterate(rhs)?;
            list.borrow_mut().extend(extra);
            Ok(current)
        }
        _ => ops::binary(op, &current, rhs),
    }
}

/// `raise X` accepts an exception class or instance.
fn instantiate(obj: Object) -> EvalResult<Exc> {
    match obj {
        Object::Exception(exc) => Ok(exc),
        Object::ExceptionType(kind) => Ok(Rc::new(ExceptionObj::new(kind, Vec::new()))),
        _ => type_error("exceptions must derive from BaseException"),
    }
}

/// Whether an `except` filter (a class or a tuple of classes) catches `exc`.
fn exception_matches(filter: &Object, exc: &Exc) -> EvalResult<bool> {
    match filter {
        Object::ExceptionType(kind) => Ok(exc_registry::is_subclass(exc.kind, *kind)),
        Object::Tuple(items) => {
            for item in items.iter() {
                if exception_matches(item, exc)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => type_error("catching classes that do not inherit from BaseException is not allowed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacking_checks_counts() {
        let pair = Object::tuple(vec![Object::Int(1), Object::Int(2)]);
        assert_eq!(unpack(&pair, 2).unwrap().len(), 2);
        let err = |r: EvalResult<Vec<Object>>| match r {
            Err(Unwind::Raise(e)) => (e.kind, e.message()),
            other => panic!("expected raise, got {other:?}"),
        };
        assert_eq!(
            err(unpack(&pair, 3)),
            (ErrorKind::ValueError, "not enough values to unpack (expected 3, got 2)".to_string())
        );
        assert_eq!(
            err(unpack(&pair, 1)),
            (ErrorKind::ValueError, "too many values to unpack (expected 1)".to_string())
        );
        assert_eq!(
            err(unpack(&Object::Int(1), 2)),
            (ErrorKind::TypeError, "cannot unpack non-iterable int object".to_string())
        );
    }

    #[test]
    fn except_filters_follow_the_hierarchy() {
        let exc = Rc::new(ExceptionObj::new(ErrorKind::KeyError, vec![]));
        assert!(exception_matches(&Object::ExceptionType(ErrorKind::LookupError), &exc).unwrap());
        assert!(exception_matches(&Object::ExceptionType(ErrorKind::Exception), &exc).unwrap());
        assert!(!exception_matches(&Object::ExceptionType(ErrorKind::ValueError), &exc).unwrap());
        let tuple = Object::tuple(vec![
            Object::ExceptionType(ErrorKind::ValueError),
            Object::ExceptionType(ErrorKind::KeyError),
        ]);
        assert!(exception_matches(&tuple, &exc).unwrap());
        assert!(exception_matches(&Object::Int(1), &exc).is_err());
    }

    #[test]
    fn list_augmented_add_extends_in_place() {
        let list = Object::list(vec![Object::Int(1)]);
        let out = in_place(BinaryOp::Add, list.clone(), &Object::tuple(vec![Object::Int(2)])).unwrap();
        assert!(out.is_same(&list));
        assert_eq!(super::super::repr::repr(&list), "[1, 2]");
    }
}
