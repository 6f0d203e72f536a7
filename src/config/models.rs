use crate::core::types::Bool;
use crate::errors::Error;
use serde::{Deserialize, Serialize};

pub trait ConfigItem<T> {
    fn get_value(&self) -> &T;
    fn set_value(&mut self, new_value: &str) -> Result<(), Error>;
    fn description(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfigItem {
    pub value: String,
    pub description: String,
}

impl TextConfigItem {
    pub fn new(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
        }
    }
}

impl ConfigItem<String> for TextConfigItem {
    fn get_value(&self) -> &String {
        &self.value
    }
    fn set_value(&mut self, new_value: &str) -> Result<(), Error> {
        let trimmed = new_value.trim();
        if trimmed.is_empty() {
            return Err(Error::Parse("Value cannot be empty.".into()));
        }
        self.value = trimmed.to_string();
        Ok(())
    }
    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfigItem {
    pub value: u16,
    pub description: String,
}

impl PortConfigItem {
    pub fn new(value: u16, description: impl Into<String>) -> Self {
        Self {
            value,
            description: description.into(),
        }
    }
}

impl ConfigItem<u16> for PortConfigItem {
    fn get_value(&self) -> &u16 {
        &self.value
    }
    fn set_value(&mut self, new_value: &str) -> Result<(), Error> {
        self.value = new_value.trim().parse::<u16>().map_err(|_| {
            Error::Parse(format!(
                "Invalid port: '{}'. Expected a number between 1 and 65535.",
                new_value.trim()
            ))
        })?;
        Ok(())
    }
    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountConfigItem {
    pub value: usize,
    pub description: String,
}

impl CountConfigItem {
    pub fn new(value: usize, description: impl Into<String>) -> Self {
        Self {
            value,
            description: description.into(),
        }
    }
}

impl ConfigItem<usize> for CountConfigItem {
    fn get_value(&self) -> &usize {
        &self.value
    }
    fn set_value(&mut self, new_value: &str) -> Result<(), Error> {
        let parsed = new_value.trim().parse::<usize>().map_err(|_| {
            Error::Parse(format!(
                "Invalid count: '{}'. Expected a positive whole number.",
                new_value.trim()
            ))
        })?;
        if parsed == 0 {
            return Err(Error::Parse("Count must be at least 1.".into()));
        }
        self.value = parsed;
        Ok(())
    }
    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoolConfigItem {
    pub value: Bool,
    pub description: String,
}

impl BoolConfigItem {
    pub fn new(value: bool, description: impl Into<String>) -> Self {
        Self {
            value: Bool(value),
            description: description.into(),
        }
    }
}

impl ConfigItem<Bool> for BoolConfigItem {
    fn get_value(&self) -> &Bool {
        &self.value
    }
    fn set_value(&mut self, new_value: &str) -> Result<(), Error> {
        Ok(self.value = Bool::try_from_str(new_value)?)
    }
    fn description(&self) -> &str {
        &self.description
    }
}
