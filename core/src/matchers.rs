//! Composable predicates over response values.
//!
//! A `Matcher` answers two questions: does the actual value satisfy it, and
//! how should it be described in a failure message. Descriptions follow the
//! familiar hamcrest wording so messages read as "Expected ... is "x"".

use std::fmt;

pub trait Matcher<T: ?Sized>: Send + Sync {
    fn matches(&self, actual: &T) -> bool;
    fn describe(&self) -> String;
}

impl<T: ?Sized> Matcher<T> for Box<dyn Matcher<T>> {
    fn matches(&self, actual: &T) -> bool {
        (**self).matches(actual)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Equality with an expected value. Literal expectations are built from this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualTo<V>(V);

pub fn equal_to<V>(value: V) -> EqualTo<V> {
    EqualTo(value)
}

impl<S: AsRef<str> + Send + Sync> Matcher<str> for EqualTo<S> {
    fn matches(&self, actual: &str) -> bool {
        actual == self.0.as_ref()
    }

    fn describe(&self) -> String {
        quoted(self.0.as_ref())
    }
}

impl Matcher<u16> for EqualTo<u16> {
    fn matches(&self, actual: &u16) -> bool {
        *actual == self.0
    }

    fn describe(&self) -> String {
        format!("<{}>", self.0)
    }
}

/// Decorates a matcher for readability: `is(equal_to("x"))`.
#[derive(Debug, Clone)]
pub struct Is<M>(M);

pub fn is<M>(matcher: M) -> Is<M> {
    Is(matcher)
}

impl<T: ?Sized, M: Matcher<T>> Matcher<T> for Is<M> {
    fn matches(&self, actual: &T) -> bool {
        self.0.matches(actual)
    }

    fn describe(&self) -> String {
        format!("is {}", self.0.describe())
    }
}

#[derive(Debug, Clone)]
pub struct Not<M>(M);

pub fn not<M>(matcher: M) -> Not<M> {
    Not(matcher)
}

impl<T: ?Sized, M: Matcher<T>> Matcher<T> for Not<M> {
    fn matches(&self, actual: &T) -> bool {
        !self.0.matches(actual)
    }

    fn describe(&self) -> String {
        format!("not {}", self.0.describe())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
    EqualsIgnoringCase,
}

/// Substring-style matcher over text.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    op: TextOp,
    expected: String,
}

pub fn contains_string(expected: impl Into<String>) -> TextMatcher {
    TextMatcher { op: TextOp::Contains, expected: expected.into() }
}

pub fn starts_with(expected: impl Into<String>) -> TextMatcher {
    TextMatcher { op: TextOp::StartsWith, expected: expected.into() }
}

pub fn ends_with(expected: impl Into<String>) -> TextMatcher {
    TextMatcher { op: TextOp::EndsWith, expected: expected.into() }
}

pub fn equal_to_ignoring_case(expected: impl Into<String>) -> TextMatcher {
    TextMatcher { op: TextOp::EqualsIgnoringCase, expected: expected.into() }
}

impl Matcher<str> for TextMatcher {
    fn matches(&self, actual: &str) -> bool {
        match self.op {
            TextOp::Contains => actual.contains(&self.expected),
            TextOp::StartsWith => actual.starts_with(&self.expected),
            TextOp::EndsWith => actual.ends_with(&self.expected),
            TextOp::EqualsIgnoringCase => actual.to_lowercase() == self.expected.to_lowercase(),
        }
    }

    fn describe(&self) -> String {
        let expected = quoted(&self.expected);
        match self.op {
            TextOp::Contains => format!("a string containing {expected}"),
            TextOp::StartsWith => format!("a string starting with {expected}"),
            TextOp::EndsWith => format!("a string ending with {expected}"),
            TextOp::EqualsIgnoringCase => format!("{expected} ignoring case"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnyOf<A, B>(A, B);

pub fn any_of<A, B>(first: A, second: B) -> AnyOf<A, B> {
    AnyOf(first, second)
}

impl<T: ?Sized, A: Matcher<T>, B: Matcher<T>> Matcher<T> for AnyOf<A, B> {
    fn matches(&self, actual: &T) -> bool {
        self.0.matches(actual) || self.1.matches(actual)
    }

    fn describe(&self) -> String {
        format!("({} or {})", self.0.describe(), self.1.describe())
    }
}

#[derive(Debug, Clone)]
pub struct AllOf<A, B>(A, B);

pub fn all_of<A, B>(first: A, second: B) -> AllOf<A, B> {
    AllOf(first, second)
}

impl<T: ?Sized, A: Matcher<T>, B: Matcher<T>> Matcher<T> for AllOf<A, B> {
    fn matches(&self, actual: &T) -> bool {
        self.0.matches(actual) && self.1.matches(actual)
    }

    fn describe(&self) -> String {
        format!("({} and {})", self.0.describe(), self.1.describe())
    }
}

/// Ad-hoc matcher from a closure and a description.
pub struct Predicate<F> {
    description: String,
    test: F,
}

pub fn predicate<F>(description: impl Into<String>, test: F) -> Predicate<F> {
    Predicate {
        description: description.into(),
        test,
    }
}

impl<F> fmt::Debug for Predicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized, F> Matcher<T> for Predicate<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn matches(&self, actual: &T) -> bool {
        (self.test)(actual)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

pub(crate) fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}
