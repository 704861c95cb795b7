//! Named producers for time-dependent answers

use super::base::{DynamicProducer, ProducerFn};
use crate::Result;
use chrono::Local;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of dynamic producers that knowledge files can refer to by name
#[derive(Clone, Default)]
pub struct ProducerRegistry {
    producers: HashMap<String, ProducerFn>,
}

impl ProducerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the clock/calendar producers
    pub fn with_builtins() -> Self {
        Self::new()
            .with("current_time", || {
                Ok(format!(
                    "The current time is {}",
                    Local::now().format("%H:%M")
                ))
            })
            .with("current_date", || {
                Ok(format!("Today is {}", Local::now().format("%-d %B %Y")))
            })
            .with("current_day", || {
                Ok(format!("Today is {}", Local::now().format("%A")))
            })
    }

    /// Register (or replace) a producer
    pub fn with<F>(mut self, name: &str, produce: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        self.register(name, produce);
        self
    }

    pub fn register<F>(&mut self, name: &str, produce: F)
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        self.producers.insert(name.to_string(), Arc::new(produce));
    }

    pub fn get(&self, name: &str) -> Option<DynamicProducer> {
        self.producers
            .get(name)
            .map(|f| DynamicProducer::new(name, Arc::clone(f)))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.producers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
