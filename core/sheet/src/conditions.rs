//! FILENAME: core/sheet/src/conditions.rs
//! PURPOSE: Field -> visual attribute mapping (conditional formatting).
//! CONTEXT: Three kinds of rule are supported: `text` recolors the cell text,
//! `background` recolors the cell background and `interval` draws a horizontal
//! bar whose length is the value's position inside a range. A rule targets
//! fields by exact name or by regular expression. When several rules of one
//! kind match a field, the last declared rule wins.

use std::fmt;
use std::rc::Rc;

use regex::Regex;
use engine::{Color, FieldValue, Record};

/// What a mapping function decided for one cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingResult {
    pub fill: Option<Color>,
    /// Interval only: use `min_value`/`max_value` instead of the field's range.
    pub is_compare: bool,
    pub max_value: Option<f64>,
    pub min_value: Option<f64>,
}

impl MappingResult {
    pub fn fill(color: Color) -> Self {
        MappingResult {
            fill: Some(color),
            ..Default::default()
        }
    }

    /// Interval bar with an explicit value range.
    pub fn compare(color: Color, min_value: f64, max_value: f64) -> Self {
        MappingResult {
            fill: Some(color),
            is_compare: true,
            max_value: Some(max_value),
            min_value: Some(min_value),
        }
    }
}

/// Mapping function: (cell value, record behind the cell) -> visual result.
/// Returning `None` leaves the cell's default look.
pub type MappingFn = Rc<dyn Fn(&FieldValue, Option<&Record>) -> Option<MappingResult>>;

#[derive(Clone)]
pub enum FieldMatcher {
    Exact(String),
    Pattern(Regex),
}

impl FieldMatcher {
    pub fn matches(&self, field: &str) -> bool {
        match self {
            FieldMatcher::Exact(name) => name == field,
            FieldMatcher::Pattern(re) => re.is_match(field),
        }
    }
}

impl fmt::Debug for FieldMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMatcher::Exact(name) => write!(f, "Exact({})", name),
            FieldMatcher::Pattern(re) => write!(f, "Pattern(/{}/)", re.as_str()),
        }
    }
}

impl From<&str> for FieldMatcher {
    fn from(name: &str) -> Self {
        FieldMatcher::Exact(name.to_string())
    }
}

impl From<Regex> for FieldMatcher {
    fn from(re: Regex) -> Self {
        FieldMatcher::Pattern(re)
    }
}

#[derive(Clone)]
pub struct Condition {
    pub field: FieldMatcher,
    pub mapping: MappingFn,
}

impl Condition {
    pub fn new<F>(field: impl Into<FieldMatcher>, mapping: F) -> Self
    where
        F: Fn(&FieldValue, Option<&Record>) -> Option<MappingResult> + 'static,
    {
        Condition {
            field: field.into(),
            mapping: Rc::new(mapping),
        }
    }

    /// Rule that always maps to one fill color.
    pub fn fixed(field: impl Into<FieldMatcher>, color: Color) -> Self {
        Condition::new(field, move |_, _| Some(MappingResult::fill(color)))
    }

    pub fn apply(&self, value: &FieldValue, record: Option<&Record>) -> Option<MappingResult> {
        (self.mapping)(value, record)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Text,
    Background,
    Interval,
}

#[derive(Debug, Clone, Default)]
pub struct Conditions {
    pub text: Vec<Condition>,
    pub background: Vec<Condition>,
    pub interval: Vec<Condition>,
}

impl Conditions {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.background.is_empty() && self.interval.is_empty()
    }

    pub fn rules(&self, kind: ConditionKind) -> &[Condition] {
        match kind {
            ConditionKind::Text => &self.text,
            ConditionKind::Background => &self.background,
            ConditionKind::Interval => &self.interval,
        }
    }

    /// Last declared rule of `kind` whose matcher accepts `field`.
    pub fn find(&self, kind: ConditionKind, field: &str) -> Option<&Condition> {
        self.rules(kind).iter().rev().find(|c| c.field.matches(field))
    }

    /// Runs the matching rule of `kind`, if any.
    pub fn evaluate(
        &self,
        kind: ConditionKind,
        field: &str,
        value: &FieldValue,
        record: Option<&Record>,
    ) -> Option<MappingResult> {
        self.find(kind, field)?.apply(value, record)
    }
}

/// Fraction of the bar an interval value fills, in `[0, 1]`.
/// A degenerate range fills the bar for any value at or above its maximum.
pub fn interval_ratio(value: f64, min_value: f64, max_value: f64) -> f64 {
    let span = max_value - min_value;
    if span <= 0.0 {
        return if value >= max_value { 1.0 } else { 0.0 };
    }
    ((value - min_value) / span).clamp(0.0, 1.0)
}
