//! FILENAME: core/pivot-engine/src/sort.rs
//! Sort Engine - ordered, field-keyed sort directives.
//!
//! A `SortState` is the sheet's list of per-field directives. The first
//! directive is the primary key; later ones break ties. The state holds at
//! most one directive per field, and changes only through `apply` (merge a
//! user request) or wholesale replacement.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use engine::{compare_values, log_debug, FieldValue};

// ============================================================================
// DIRECTIVES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortMethod {
    #[default]
    #[serde(rename = "asc", alias = "ASC", alias = "Asc")]
    Asc,
    #[serde(rename = "desc", alias = "DESC", alias = "Desc")]
    Desc,
}

impl SortMethod {
    /// Parses a sort menu key ("asc" / "desc", any case).
    pub fn from_key(key: &str) -> Option<SortMethod> {
        match key.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortMethod::Asc),
            "desc" => Some(SortMethod::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMethod::Asc => "asc",
            SortMethod::Desc => "desc",
        }
    }
}

/// Sort instruction for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortDirective {
    pub sort_field_id: String,

    #[serde(default)]
    pub sort_method: SortMethod,

    /// Explicit value order. Overrides `sort_method` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<Vec<FieldValue>>,
}

impl SortDirective {
    pub fn new(field: impl Into<String>, method: SortMethod) -> Self {
        SortDirective {
            sort_field_id: field.into(),
            sort_method: method,
            sort_by: None,
        }
    }

    pub fn with_sort_by<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.sort_by = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Position of `value` in the explicit order. Unlisted values rank after
    /// every listed one and tie among themselves.
    fn rank_of(sort_by: &[FieldValue], value: &FieldValue) -> usize {
        let key = value.key();
        sort_by
            .iter()
            .position(|v| v.key() == key)
            .unwrap_or(sort_by.len())
    }

    /// Orders two values of this directive's field.
    /// Equal results leave the caller's stable order untouched.
    pub fn compare(&self, a: &FieldValue, b: &FieldValue) -> Ordering {
        if let Some(sort_by) = &self.sort_by {
            return Self::rank_of(sort_by, a).cmp(&Self::rank_of(sort_by, b));
        }
        match self.sort_method {
            SortMethod::Asc => compare_values(a, b),
            SortMethod::Desc => compare_values(b, a),
        }
    }
}

/// A user sort action: "sort `field_id` by `method`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRequest {
    pub field_id: String,
    pub method: SortMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<Vec<FieldValue>>,
}

impl SortRequest {
    pub fn new(field_id: impl Into<String>, method: SortMethod) -> Self {
        SortRequest {
            field_id: field_id.into(),
            method,
            sort_by: None,
        }
    }
}

// ============================================================================
// SORT STATE
// ============================================================================

/// Ordered directives, unique by field. Serializes as a plain array
/// (`sortParams`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<SortDirective>", into = "Vec<SortDirective>")]
pub struct SortState {
    directives: Vec<SortDirective>,
}

impl SortState {
    pub fn new() -> Self {
        SortState::default()
    }

    /// Builds a state from a list, keeping the last directive of any field
    /// that appears more than once.
    pub fn from_directives(list: Vec<SortDirective>) -> Self {
        let mut directives: Vec<SortDirective> = Vec::with_capacity(list.len());
        for directive in list {
            directives.retain(|d| d.sort_field_id != directive.sort_field_id);
            directives.push(directive);
        }
        SortState { directives }
    }

    pub fn directives(&self) -> &[SortDirective] {
        &self.directives
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SortDirective> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&SortDirective> {
        self.directives.iter().find(|d| d.sort_field_id == field)
    }

    /// Priority of `field` (0 = primary key).
    pub fn position(&self, field: &str) -> Option<usize> {
        self.directives.iter().position(|d| d.sort_field_id == field)
    }

    /// Folds a request into the state.
    ///
    /// An existing directive for the field is taken out of its slot and the
    /// merged directive goes to the end: the method is replaced, `sort_by` is
    /// replaced only when the request carries one. A new field is appended.
    pub fn apply(&self, request: SortRequest) -> SortState {
        let mut directives = self.directives.clone();
        let merged = match directives
            .iter()
            .position(|d| d.sort_field_id == request.field_id)
        {
            Some(index) => {
                let previous = directives.remove(index);
                SortDirective {
                    sort_field_id: previous.sort_field_id,
                    sort_method: request.method,
                    sort_by: request.sort_by.or(previous.sort_by),
                }
            }
            None => SortDirective {
                sort_field_id: request.field_id,
                sort_method: request.method,
                sort_by: request.sort_by,
            },
        };

        log_debug!(
            "SORT",
            "apply field={} method={} -> {} directive(s)",
            merged.sort_field_id,
            merged.sort_method.as_str(),
            directives.len() + 1
        );

        directives.push(merged);
        SortState { directives }
    }
}

impl From<Vec<SortDirective>> for SortState {
    fn from(list: Vec<SortDirective>) -> Self {
        SortState::from_directives(list)
    }
}

impl From<SortState> for Vec<SortDirective> {
    fn from(state: SortState) -> Self {
        state.directives
    }
}

impl<'a> IntoIterator for &'a SortState {
    type Item = &'a SortDirective;
    type IntoIter = std::slice::Iter<'a, SortDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.iter()
    }
}

/// Pure merge of a request into a state. See [`SortState::apply`].
pub fn apply_sort(current: &SortState, request: SortRequest) -> SortState {
    current.apply(request)
}
