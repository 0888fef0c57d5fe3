//! Validated command arguments.

use std::ops::Index;

/// One argument that passed its parameter pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    value: String,
}

impl Param {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn as_int(&self) -> Option<i64> {
        self.value.parse().ok()
    }

    pub fn as_uint(&self) -> Option<u64> {
        self.value.parse().ok()
    }

    pub fn as_float(&self) -> Option<f64> {
        self.value.parse().ok()
    }

    /// True for `1`, `t`, `true`, `y`, `yes` and `on`, ignoring case.
    /// Anything else is false.
    pub fn as_bool(&self) -> bool {
        matches!(
            self.value.to_ascii_lowercase().as_str(),
            "1" | "t" | "true" | "y" | "yes" | "on"
        )
    }
}

/// Arguments of one invocation, in declaration order.
///
/// Optional parameters the caller did not supply are absent, so the list
/// may be shorter than the command's parameter schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList(Vec<Param>);

impl ParamList {
    pub(crate) fn new(params: Vec<Param>) -> Self {
        Self(params)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<&Param> {
        self.0.get(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.0.iter()
    }

    /// All values joined by single spaces.
    pub fn join(&self) -> String {
        self.0
            .iter()
            .map(Param::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Index<usize> for ParamList {
    type Output = Param;

    fn index(&self, n: usize) -> &Param {
        &self.0[n]
    }
}
