use std::collections::BTreeMap;
use std::fmt;

use crate::command::{Command, CommandFactory};
use crate::errors::{ConsoleError, ConsoleResult};

/// Source of commands that are created on demand.
pub trait CommandLoader {
    fn has(&self, name: &str) -> bool;

    fn get(&self, name: &str) -> ConsoleResult<Box<dyn Command>>;

    fn names(&self) -> Vec<String>;
}

/// Loader backed by a name to factory map.
#[derive(Clone, Default)]
pub struct FactoryCommandLoader {
    factories: BTreeMap<String, CommandFactory>,
}

impl FactoryCommandLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, factory: CommandFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl CommandLoader for FactoryCommandLoader {
    fn has(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    fn get(&self, name: &str) -> ConsoleResult<Box<dyn Command>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ConsoleError::CommandNotFound(name.to_string()))
    }

    fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl fmt::Debug for FactoryCommandLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryCommandLoader")
            .field("names", &self.names())
            .finish()
    }
}
