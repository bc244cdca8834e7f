// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Binding of captured groups to step handler parameters.
//!
//! Every handler parameter has one of a closed set of [`Shape`]s, fixed by its
//! Rust type at registration time:
//!
//! | Rust type                 | [`Shape`]              | source               |
//! |---------------------------|------------------------|----------------------|
//! | [`String`]                | [`Shape::Text`]        | next captured group  |
//! | `i8`..`i128`, `u8`..`usize` | [`Shape::Integer`]   | next captured group  |
//! | [`bool`]                  | [`Shape::Boolean`]     | next captured group  |
//! | [`Isolation`]             | [`Shape::Isolation`]   | injected             |
//! | [`Reporter`]              | [`Shape::Reporter`]    | injected             |
//!
//! Injected parameters may appear anywhere in the parameter list and never
//! consume a captured group.
//!
//! A [`bool`] parameter is `true` when its captured group is **non-empty**.
//! For a pattern like `there is( not)? a directory`, the parameter is `true`
//! when `not` is present.

use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    marker::PhantomData,
    rc::Rc,
};

use derive_more::{Display, Error, From};
use sealed::sealed;

/// Shape of a step handler parameter.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Shape {
    /// Captured text, passed verbatim.
    #[display("text")]
    Text,

    /// Captured text parsed as a base-10 integer.
    #[display("integer")]
    Integer,

    /// `true` if the captured text is non-empty.
    #[display("boolean")]
    Boolean,

    /// Per-scenario [`Isolation`] context.
    #[display("isolation context")]
    Isolation,

    /// Host [`Reporter`] handle.
    #[display("reporter")]
    Reporter,
}

impl Shape {
    /// Indicates whether this [`Shape`] is injected rather than bound to a
    /// captured group.
    #[must_use]
    pub const fn is_injected(self) -> bool {
        matches!(self, Self::Isolation | Self::Reporter)
    }
}

/// Per-scenario isolation context.
///
/// A fresh value is created at the start of every scenario, and the same value
/// is handed to every step of that scenario (its background included), so state
/// accumulates across `Given`/`When`/`Then` but never leaks into another
/// scenario.
pub struct Isolation<W>(Rc<RefCell<W>>);

impl<W> Isolation<W> {
    pub(crate) fn new(world: W) -> Self {
        Self(Rc::new(RefCell::new(world)))
    }

    /// Immutably borrows the context.
    ///
    /// # Panics
    ///
    /// If the context is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, W> {
        self.0.borrow()
    }

    /// Mutably borrows the context.
    ///
    /// # Panics
    ///
    /// If the context is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, W> {
        self.0.borrow_mut()
    }

    /// Runs `f` with mutable access to the context.
    pub fn with<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

// Implemented manually to omit redundant `W: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<W> Clone for Isolation<W> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<W: fmt::Debug> fmt::Debug for Isolation<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Isolation").field(&self.0.borrow()).finish()
    }
}

/// Handle to the host test-reporting API, scoped to a single step.
///
/// Messages passed to [`Reporter::log()`] are forwarded to the [`Writer`];
/// [`Reporter::error()`] marks the step as failed without interrupting the
/// handler. Returning an [`Err`] or panicking fails the step immediately.
///
/// [`Writer`]: crate::Writer
#[derive(Clone, Debug, Default)]
pub struct Reporter(Rc<RefCell<Record>>);

#[derive(Debug, Default)]
struct Record {
    logs: Vec<String>,
    errors: Vec<String>,
}

impl Reporter {
    /// Records an informational message.
    pub fn log(&self, msg: impl Into<String>) {
        self.0.borrow_mut().logs.push(msg.into());
    }

    /// Records an error, marking the current step as failed.
    pub fn error(&self, msg: impl Into<String>) {
        self.0.borrow_mut().errors.push(msg.into());
    }

    /// Indicates whether [`Reporter::error()`] has been called.
    #[must_use]
    pub fn failed(&self) -> bool {
        !self.0.borrow().errors.is_empty()
    }

    /// Takes the recorded logs and errors, leaving this [`Reporter`] empty.
    pub(crate) fn take(&self) -> (Vec<String>, Vec<String>) {
        let mut rec = self.0.borrow_mut();
        (std::mem::take(&mut rec.logs), std::mem::take(&mut rec.errors))
    }
}

/// Everything a handler invocation may draw its arguments from.
#[doc(hidden)]
#[derive(Debug)]
pub struct Scope<'s, W> {
    pub(crate) isolation: &'s Isolation<W>,
    pub(crate) reporter: &'s Reporter,
    pub(crate) step: &'s str,
}

impl<'s, W> Scope<'s, W> {
    pub(crate) fn new(
        isolation: &'s Isolation<W>,
        reporter: &'s Reporter,
        step: &'s str,
    ) -> Self {
        Self { isolation, reporter, step }
    }
}

/// Type usable as a step handler parameter.
///
/// This trait is sealed: the set of [`Shape`]s is closed.
#[sealed]
pub trait Param<W>: Sized {
    /// [`Shape`] of this parameter.
    const SHAPE: Shape;

    /// Builds the argument from the next captured group (always [`None`] for
    /// injected shapes). `index` is the 0-based position among non-injected
    /// parameters.
    #[doc(hidden)]
    fn bind(
        scope: &Scope<'_, W>,
        group: Option<&str>,
        index: usize,
    ) -> Result<Self, BindError>;
}

#[sealed]
impl<W> Param<W> for String {
    const SHAPE: Shape = Shape::Text;

    fn bind(
        _: &Scope<'_, W>,
        group: Option<&str>,
        _: usize,
    ) -> Result<Self, BindError> {
        // A missing trailing text group is a text block that wasn't written.
        Ok(group.unwrap_or_default().to_owned())
    }
}

#[sealed]
impl<W> Param<W> for bool {
    const SHAPE: Shape = Shape::Boolean;

    fn bind(
        _: &Scope<'_, W>,
        group: Option<&str>,
        _: usize,
    ) -> Result<Self, BindError> {
        Ok(!group.unwrap_or_default().is_empty())
    }
}

#[sealed]
impl<W> Param<W> for Isolation<W> {
    const SHAPE: Shape = Shape::Isolation;

    fn bind(
        scope: &Scope<'_, W>,
        _: Option<&str>,
        _: usize,
    ) -> Result<Self, BindError> {
        Ok(scope.isolation.clone())
    }
}

#[sealed]
impl<W> Param<W> for Reporter {
    const SHAPE: Shape = Shape::Reporter;

    fn bind(
        scope: &Scope<'_, W>,
        _: Option<&str>,
        _: usize,
    ) -> Result<Self, BindError> {
        Ok(scope.reporter.clone())
    }
}

macro_rules! integer_param {
    ($($ty:ty),* $(,)?) => {$(
        #[sealed]
        impl<W> Param<W> for $ty {
            const SHAPE: Shape = Shape::Integer;

            fn bind(
                scope: &Scope<'_, W>,
                group: Option<&str>,
                index: usize,
            ) -> Result<Self, BindError> {
                let value = group.unwrap_or_default();
                value.parse().map_err(|_| {
                    ValueCoercionError {
                        step: scope.step.to_owned(),
                        value: value.to_owned(),
                        index,
                        shape: Shape::Integer,
                    }
                    .into()
                })
            }
        }
    )*};
}

integer_param!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Return type of a step handler.
pub trait StepOutput {
    /// Converts the handler's return value into its outcome, with the failure
    /// message on [`Err`].
    ///
    /// # Errors
    ///
    /// If the handler reported a failure.
    fn into_outcome(self) -> Result<(), String>;
}

impl StepOutput for () {
    fn into_outcome(self) -> Result<(), String> {
        Ok(())
    }
}

impl<E: fmt::Display> StepOutput for Result<(), E> {
    fn into_outcome(self) -> Result<(), String> {
        self.map_err(|e| e.to_string())
    }
}

/// Step handler: any [`Fn`] of up to 8 [`Param`]s returning a
/// [`StepOutput`].
///
/// `Args` is the tuple of parameter types and only serves to tell the
/// implementations apart.
pub trait Handler<W, Args> {
    /// [`Shape`]s of the parameters, in declaration order.
    #[doc(hidden)]
    fn shapes(&self) -> Vec<Shape>;

    /// Binds `groups` to the parameters and invokes the handler.
    ///
    /// The outer [`Result`] is the binding outcome, the inner one is the
    /// handler's own.
    #[doc(hidden)]
    fn call(
        &self,
        scope: &Scope<'_, W>,
        groups: &[String],
    ) -> Result<Result<(), String>, BindError>;
}

/// Binds the next parameter, consuming a group unless its [`Shape`] is
/// injected.
fn bind_next<'g, W, P: Param<W>>(
    scope: &Scope<'_, W>,
    groups: &mut impl Iterator<Item = &'g str>,
    position: &mut usize,
) -> Result<P, BindError> {
    if P::SHAPE.is_injected() {
        return P::bind(scope, None, 0);
    }
    let index = *position;
    *position += 1;
    P::bind(scope, groups.next(), index)
}

macro_rules! handler {
    () => {
        impl<W, F, R> Handler<W, ()> for F
        where
            F: Fn() -> R,
            R: StepOutput,
        {
            fn shapes(&self) -> Vec<Shape> {
                Vec::new()
            }

            fn call(
                &self,
                _: &Scope<'_, W>,
                _: &[String],
            ) -> Result<Result<(), String>, BindError> {
                Ok((self)().into_outcome())
            }
        }
    };
    ($($arg:ident),+) => {
        impl<W, F, R, $($arg,)+> Handler<W, ($($arg,)+)> for F
        where
            F: Fn($($arg),+) -> R,
            R: StepOutput,
            $($arg: Param<W>,)+
        {
            fn shapes(&self) -> Vec<Shape> {
                vec![$($arg::SHAPE),+]
            }

            // Bindings reuse the uppercase type parameter names.
            #[allow(non_snake_case)]
            fn call(
                &self,
                scope: &Scope<'_, W>,
                groups: &[String],
            ) -> Result<Result<(), String>, BindError> {
                let mut groups = groups.iter().map(String::as_str);
                let mut position = 0;
                $(
                    let $arg = bind_next::<W, $arg>(
                        scope,
                        &mut groups,
                        &mut position,
                    )?;
                )+
                Ok((self)($($arg),+).into_outcome())
            }
        }
    };
}

handler!();
handler!(A1);
handler!(A1, A2);
handler!(A1, A2, A3);
handler!(A1, A2, A3, A4);
handler!(A1, A2, A3, A4, A5);
handler!(A1, A2, A3, A4, A5, A6);
handler!(A1, A2, A3, A4, A5, A6, A7);
handler!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Type-erased [`Handler`] stored inside a [`Collection`].
///
/// [`Collection`]: crate::step::Collection
pub(crate) struct BoxedHandler<W> {
    shapes: Vec<Shape>,
    inner: Box<dyn Erased<W>>,
}

impl<W> BoxedHandler<W> {
    pub(crate) fn new<Args, H>(handler: H) -> Self
    where
        W: 'static,
        Args: 'static,
        H: Handler<W, Args> + 'static,
    {
        Self {
            shapes: handler.shapes(),
            inner: Box::new(Typed { handler, _args: PhantomData }),
        }
    }

    pub(crate) fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Checks the arity of `groups` and invokes the handler.
    pub(crate) fn invoke(
        &self,
        scope: &Scope<'_, W>,
        groups: &[String],
    ) -> Result<Result<(), String>, BindError> {
        check_arity(scope.step, &self.shapes, groups.len())?;
        self.inner.call(scope, groups)
    }
}

impl<W> fmt::Debug for BoxedHandler<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedHandler")
            .field("shapes", &self.shapes)
            .finish_non_exhaustive()
    }
}

trait Erased<W> {
    fn call(
        &self,
        scope: &Scope<'_, W>,
        groups: &[String],
    ) -> Result<Result<(), String>, BindError>;
}

struct Typed<H, Args> {
    handler: H,
    _args: PhantomData<fn() -> Args>,
}

impl<W, Args, H: Handler<W, Args>> Erased<W> for Typed<H, Args> {
    fn call(
        &self,
        scope: &Scope<'_, W>,
        groups: &[String],
    ) -> Result<Result<(), String>, BindError> {
        self.handler.call(scope, groups)
    }
}

/// Reconciles the number of captured `groups` with the handler's `shapes`.
///
/// Every non-injected parameter consumes one group. Fewer groups than such
/// parameters is only allowed when all of the unsatisfied ones are
/// [`Shape::Text`] (they receive an empty string).
///
/// # Errors
///
/// If the counts cannot be reconciled.
pub fn check_arity(
    step: &str,
    shapes: &[Shape],
    groups: usize,
) -> Result<(), ArityMismatch> {
    let required = shapes
        .iter()
        .copied()
        .filter(|s| !s.is_injected())
        .collect::<Vec<_>>();
    if groups > required.len()
        || required[groups..].iter().any(|s| *s != Shape::Text)
    {
        return Err(ArityMismatch {
            step: step.to_owned(),
            groups,
            required: required.len(),
        });
    }
    Ok(())
}

/// Error of binding captured groups to handler parameters.
#[derive(Clone, Debug, Display, Eq, Error, From, PartialEq)]
pub enum BindError {
    /// Group count doesn't match the handler's parameters.
    #[display("{_0}")]
    Arity(ArityMismatch),

    /// A captured group couldn't be coerced into its parameter's [`Shape`].
    #[display("{_0}")]
    Coercion(ValueCoercionError),
}

/// Number of captured groups doesn't match the handler's parameters.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display(
    "pattern provided {groups} groups, but the step requires {required} \
     arguments:\n\t{step}"
)]
pub struct ArityMismatch {
    /// Step text.
    pub step: String,

    /// Number of captured groups, text block included.
    pub groups: usize,

    /// Number of non-injected handler parameters.
    pub required: usize,
}

/// Captured group couldn't be coerced into its parameter's [`Shape`].
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("cannot use `{value}` (group {index}) as {shape} in step: {step}")]
pub struct ValueCoercionError {
    /// Step text.
    pub step: String,

    /// Captured text.
    pub value: String,

    /// 0-based position of the group.
    pub index: usize,

    /// Expected [`Shape`].
    pub shape: Shape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct World {
        values: Vec<String>,
    }

    fn boxed<Args: 'static, H: Handler<World, Args> + 'static>(
        handler: H,
    ) -> BoxedHandler<World> {
        BoxedHandler::new(handler)
    }

    fn invoke(
        handler: &BoxedHandler<World>,
        groups: &[&str],
    ) -> (Result<Result<(), String>, BindError>, Isolation<World>) {
        let isolation = Isolation::new(World::default());
        let reporter = Reporter::default();
        let groups = groups.iter().map(|&g| g.to_owned()).collect::<Vec<_>>();
        let res = handler
            .invoke(&Scope::new(&isolation, &reporter, "a step"), &groups);
        (res, isolation)
    }

    #[test]
    fn shapes_follow_declaration_order() {
        let handler = boxed(
            |_: Reporter, _: i64, _: Isolation<World>, _: bool, _: String| {},
        );

        assert_eq!(
            handler.shapes(),
            [
                Shape::Reporter,
                Shape::Integer,
                Shape::Isolation,
                Shape::Boolean,
                Shape::Text,
            ],
        );
    }

    #[test]
    fn integer_group_is_parsed() {
        let handler = boxed(|w: Isolation<World>, n: i64| {
            w.borrow_mut().values.push(format!("{}", n + 1));
        });

        let (res, w) = invoke(&handler, &["42"]);

        assert_eq!(res, Ok(Ok(())));
        assert_eq!(w.borrow().values, ["43"]);
    }

    #[test]
    fn groups_bind_in_capture_order_around_injected_params() {
        let handler = boxed(
            |a: String, w: Isolation<World>, b: u32, r: Reporter, c: String| {
                r.log("called");
                w.with(|w| w.values.extend([a, b.to_string(), c]));
            },
        );

        let (res, w) = invoke(&handler, &["first", "2", "third"]);

        assert_eq!(res, Ok(Ok(())));
        assert_eq!(w.borrow().values, ["first", "2", "third"]);
    }

    #[test]
    fn boolean_is_true_for_non_empty_group() {
        let handler = boxed(|w: Isolation<World>, not: bool| {
            w.borrow_mut().values.push(not.to_string());
        });

        let (_, w) = invoke(&handler, &[" not"]);
        assert_eq!(w.borrow().values, ["true"]);

        let (_, w) = invoke(&handler, &[""]);
        assert_eq!(w.borrow().values, ["false"]);
    }

    #[test]
    fn missing_trailing_text_becomes_empty() {
        let handler = boxed(|w: Isolation<World>, name: String, doc: String| {
            w.borrow_mut().values.extend([name, doc]);
        });

        let (res, w) = invoke(&handler, &["name"]);

        assert_eq!(res, Ok(Ok(())));
        assert_eq!(w.borrow().values, ["name", ""]);
    }

    #[test]
    fn handler_without_params() {
        let handler = boxed(|| Err::<(), _>("nothing to do"));

        assert!(handler.shapes().is_empty());
        assert_eq!(invoke(&handler, &[]).0, Ok(Err("nothing to do".into())));
        assert_eq!(
            invoke(&handler, &["extra"]).0,
            Err(BindError::Arity(ArityMismatch {
                step: "a step".into(),
                groups: 1,
                required: 0,
            })),
        );
    }

    #[test]
    fn missing_integer_is_arity_mismatch() {
        let handler = boxed(|_: String, _: i32| {});

        let (res, _) = invoke(&handler, &["only one"]);

        assert_eq!(
            res,
            Err(BindError::Arity(ArityMismatch {
                step: "a step".into(),
                groups: 1,
                required: 2,
            })),
        );
    }

    #[test]
    fn surplus_groups_are_arity_mismatch() {
        let handler = boxed(|_: Isolation<World>| {});

        let (res, _) = invoke(&handler, &["unused"]);

        assert!(matches!(
            res,
            Err(BindError::Arity(ArityMismatch { groups: 1, required: 0, .. })),
        ));
    }

    #[test]
    fn bad_integer_is_coercion_error() {
        let handler = boxed(|_: String, _: u8| {});

        let (res, _) = invoke(&handler, &["x", "300"]);

        assert_eq!(
            res,
            Err(BindError::Coercion(ValueCoercionError {
                step: "a step".into(),
                value: "300".into(),
                index: 1,
                shape: Shape::Integer,
            })),
        );
    }

    #[test]
    fn result_output_is_propagated() {
        let handler = boxed(|| -> Result<(), &'static str> { Err("nope") });

        let (res, _) = invoke(&handler, &[]);

        assert_eq!(res, Ok(Err("nope".into())));
    }

    #[test]
    fn reporter_records_logs_and_errors() {
        let reporter = Reporter::default();
        reporter.log("hello");
        assert!(!reporter.failed());
        reporter.error("broken");
        assert!(reporter.failed());

        let (logs, errors) = reporter.take();
        assert_eq!(logs, ["hello"]);
        assert_eq!(errors, ["broken"]);
        assert!(!reporter.failed());
    }

    #[test]
    fn check_arity_allows_only_text_shortfall() {
        use Shape::*;

        assert!(check_arity("s", &[Isolation, Text, Text], 1).is_ok());
        assert!(check_arity("s", &[Reporter], 0).is_ok());
        assert!(check_arity("s", &[Text, Integer], 1).is_err());
        assert!(check_arity("s", &[Boolean], 0).is_err());
        assert!(check_arity("s", &[Text], 2).is_err());
    }
}
