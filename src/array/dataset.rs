//! Named collections of arrays and the single-or-many payload type.

use indexmap::IndexMap;

use super::{AttrValue, Attrs, LabeledArray};
use crate::error::{GroupError, Result};

/// Ordered mapping of variable name to array, with dataset-level attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    vars: IndexMap<String, LabeledArray>,
    attrs: Attrs,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable, naming the array after its key.
    pub fn insert(&mut self, name: impl Into<String>, array: LabeledArray) -> Option<LabeledArray> {
        let name = name.into();
        let array = array.with_name(name.clone());
        self.vars.insert(name, array)
    }

    pub fn with_var(mut self, name: impl Into<String>, array: LabeledArray) -> Self {
        self.insert(name, array);
        self
    }

    pub fn get(&self, name: &str) -> Option<&LabeledArray> {
        self.vars.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabeledArray)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }
}

impl FromIterator<(String, LabeledArray)> for Dataset {
    fn from_iter<T: IntoIterator<Item = (String, LabeledArray)>>(iter: T) -> Self {
        let mut ds = Self::new();
        for (name, array) in iter {
            ds.insert(name, array);
        }
        ds
    }
}

impl IntoIterator for Dataset {
    type Item = (String, LabeledArray);
    type IntoIter = indexmap::map::IntoIter<String, LabeledArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

/// Either a single array or a dataset: the payload of grouping operations
/// and of caller-supplied reductions.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Array(LabeledArray),
    Dataset(Dataset),
}

impl Data {
    pub fn as_array(&self) -> Option<&LabeledArray> {
        match self {
            Self::Array(array) => Some(array),
            Self::Dataset(_) => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            Self::Dataset(ds) => Some(ds),
            Self::Array(_) => None,
        }
    }

    pub fn into_array(self) -> Result<LabeledArray> {
        match self {
            Self::Array(array) => Ok(array),
            Self::Dataset(_) => Err(GroupError::incompatible(
                "expected a single array, got a dataset",
            )),
        }
    }

    pub fn into_dataset(self) -> Result<Dataset> {
        match self {
            Self::Dataset(ds) => Ok(ds),
            Self::Array(_) => Err(GroupError::incompatible(
                "expected a dataset, got a single array",
            )),
        }
    }

    /// Variable `name` of a dataset payload.
    pub fn var(&self, name: &str) -> Result<&LabeledArray> {
        self.as_dataset()
            .and_then(|ds| ds.get(name))
            .ok_or_else(|| GroupError::incompatible(format!("no variable named '{name}'")))
    }

    /// Every array in the payload.
    pub fn arrays(&self) -> Vec<&LabeledArray> {
        match self {
            Self::Array(array) => vec![array],
            Self::Dataset(ds) => ds.vars.values().collect(),
        }
    }

    /// Apply `f` to every array, keeping the payload shape and dataset attrs.
    pub fn map_arrays<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&LabeledArray) -> Result<LabeledArray>,
    {
        match self {
            Self::Array(array) => Ok(Self::Array(f(array)?)),
            Self::Dataset(ds) => {
                let mut out = Dataset::new();
                for (name, array) in &ds.vars {
                    out.insert(name.clone(), f(array)?);
                }
                out.attrs = ds.attrs.clone();
                Ok(Self::Dataset(out))
            }
        }
    }

    /// Set an attribute on the dataset (if any) and on every array.
    pub fn set_attr(&mut self, key: &str, value: AttrValue) {
        match self {
            Self::Array(array) => {
                array.attrs_mut().insert(key.to_string(), value);
            }
            Self::Dataset(ds) => {
                ds.attrs.insert(key.to_string(), value.clone());
                for array in ds.vars.values_mut() {
                    array.attrs_mut().insert(key.to_string(), value.clone());
                }
            }
        }
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        match self {
            Self::Array(array) => array.attrs().get(key),
            Self::Dataset(ds) => ds.attrs.get(key),
        }
    }
}

impl From<LabeledArray> for Data {
    fn from(array: LabeledArray) -> Self {
        Self::Array(array)
    }
}

impl From<&LabeledArray> for Data {
    fn from(array: &LabeledArray) -> Self {
        Self::Array(array.clone())
    }
}

impl From<Dataset> for Data {
    fn from(ds: Dataset) -> Self {
        Self::Dataset(ds)
    }
}

impl From<&Dataset> for Data {
    fn from(ds: &Dataset) -> Self {
        Self::Dataset(ds.clone())
    }
}
