use crate::errors::{Error, Result};
use crate::extensions::enums::valid_csv;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter as EnumIterDerive, EnumString};

/// Precedence relationship types of the precedence diagramming method.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    AsRefStr,
    EnumIterDerive,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum RelationType {
    /// Finish-to-start: successor starts after predecessor finishes.
    #[strum(serialize = "fs", serialize = "finish-to-start", to_string = "FS")]
    FS,
    /// Start-to-start: successor starts after predecessor starts.
    #[strum(serialize = "ss", serialize = "start-to-start", to_string = "SS")]
    SS,
    /// Finish-to-finish: successor finishes after predecessor finishes.
    #[strum(serialize = "ff", serialize = "finish-to-finish", to_string = "FF")]
    FF,
    /// Start-to-finish: successor finishes after predecessor starts.
    #[strum(serialize = "sf", serialize = "start-to-finish", to_string = "SF")]
    SF,
}

impl RelationType {
    pub fn try_from(s: &str) -> Result<Self> {
        Self::from_str(s).map_err(|_| {
            Error::Parse(format!(
                "Invalid relationship type: '{}'. Valid types: {}",
                s.trim(),
                valid_csv::<RelationType>()
            ))
        })
    }

    pub fn help(&self) -> &'static str {
        match self {
            RelationType::FS => "Successor may start once the predecessor finishes.",
            RelationType::SS => "Successor may start once the predecessor starts.",
            RelationType::FF => "Successor may finish once the predecessor finishes.",
            RelationType::SF => "Successor may finish once the predecessor starts.",
        }
    }
}

/// Top-level menu options of the interactive shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIterDerive)]
pub enum MenuChoice {
    AddActivity,
    DeleteActivity,
    AddRelationship,
    DeleteRelationship,
    DissolveActivity,
    OpenPrompt,
    RunSchedule,
    Quit,
}

impl MenuChoice {
    pub fn try_from(s: &str) -> Result<Self> {
        match s.trim() {
            "1" => Ok(MenuChoice::AddActivity),
            "2" => Ok(MenuChoice::DeleteActivity),
            "3" => Ok(MenuChoice::AddRelationship),
            "4" => Ok(MenuChoice::DeleteRelationship),
            "5" => Ok(MenuChoice::DissolveActivity),
            "6" => Ok(MenuChoice::OpenPrompt),
            "7" => Ok(MenuChoice::RunSchedule),
            "8" => Ok(MenuChoice::Quit),
            other => Err(Error::UnknownChoice(format!(
                "'{}'. Please enter a number between 1 and 8.",
                other
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::AddActivity => "Add Activity",
            MenuChoice::DeleteActivity => "Delete Activity",
            MenuChoice::AddRelationship => "Add Relationship",
            MenuChoice::DeleteRelationship => "Delete Relationship",
            MenuChoice::DissolveActivity => "Dissolve Activity",
            MenuChoice::OpenPrompt => "Open Prompt (Natural Language)",
            MenuChoice::RunSchedule => "Run Schedule",
            MenuChoice::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr, EnumIterDerive)]
#[strum(ascii_case_insensitive)]
pub enum BoolFormat {
    #[strum(serialize = "true", serialize = "True", to_string = "True")]
    TextTrue,

    #[strum(serialize = "false", serialize = "False", to_string = "False")]
    TextFalse,
}

impl BoolFormat {
    #[inline]
    fn to_bool(self) -> bool {
        matches!(self, BoolFormat::TextTrue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bool(pub bool);

impl Bool {
    pub fn try_from_str(s: &str) -> Result<Self> {
        match BoolFormat::from_str(s) {
            Ok(fmt) => Ok(Bool(fmt.to_bool())),
            Err(_) => Err(Error::Parse(format!(
                "Invalid string value for boolean: '{}'. Valid values: {}",
                s,
                valid_csv::<BoolFormat>()
            ))),
        }
    }
}

impl fmt::Display for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.0 { "True" } else { "False" })
    }
}

impl Serialize for Bool {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<<S as Serializer>::Ok, <S as Serializer>::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bool {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Bool, <D as Deserializer<'de>>::Error> {
        let b = String::deserialize(deserializer)?;
        Bool::try_from_str(&b).map_err(serde::de::Error::custom)
    }
}
