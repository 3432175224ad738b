//! Ordered runtime flags handed to the inference engine.

use serde::Serialize;

/// A single engine flag: a switch, or a name with one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flag {
    pub name: String,
    pub value: Option<String>,
}

/// Flags in the order they will appear on the command line.
///
/// Duplicates are kept; [`FlagSet::get`] resolves them last-wins, matching
/// how the engine's parser treats repeated options. Serializes as the bare
/// list of flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bare switch.
    pub fn switch(&mut self, name: &str) -> &mut Self {
        self.flags.push(Flag {
            name: name.to_string(),
            value: None,
        });
        self
    }

    /// Append a flag with a value.
    pub fn set(&mut self, name: &str, value: impl ToString) -> &mut Self {
        self.flags.push(Flag {
            name: name.to_string(),
            value: Some(value.to_string()),
        });
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name)
    }

    /// Value of the last occurrence of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .rev()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
    }

    /// Index of the first occurrence of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.flags.iter().position(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flatten into command-line tokens.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.flags.len() * 2);
        for flag in &self.flags {
            args.push(flag.name.clone());
            if let Some(value) = &flag.value {
                args.push(value.clone());
            }
        }
        args
    }
}
