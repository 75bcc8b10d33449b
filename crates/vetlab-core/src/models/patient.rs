//! Patient models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Species accepted at registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Species {
    #[default]
    Dog,
    Cat,
    Bird,
    Rabbit,
    Other,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::Dog,
        Species::Cat,
        Species::Bird,
        Species::Rabbit,
        Species::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
            Species::Bird => "Bird",
            Species::Rabbit => "Rabbit",
            Species::Other => "Other",
        }
    }

    /// Parse a species label, case-insensitively.
    pub fn parse(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().to_lowercase() == lower)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Sequential registry ID (`P001`, `P002`, ...)
    pub id: String,
    /// Patient name
    pub name: String,
    pub species: Species,
    pub breed: String,
    /// Age in whole years
    pub age: u32,
    /// Owner/client name
    pub owner: String,
}

/// Registration form data; everything but the generated ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewPatient {
    pub name: String,
    pub species: Species,
    pub breed: String,
    pub age: u32,
    pub owner: String,
}

impl NewPatient {
    pub fn new(name: impl Into<String>, species: Species, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species,
            owner: owner.into(),
            ..Default::default()
        }
    }

    /// Names of required fields left blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.owner.trim().is_empty() {
            missing.push("owner");
        }
        missing
    }

    /// Assign the registry ID for a registry currently holding `existing` patients.
    pub fn into_patient(self, existing: usize) -> Patient {
        Patient {
            id: patient_id_for_index(existing + 1),
            name: self.name,
            species: self.species,
            breed: self.breed,
            age: self.age,
            owner: self.owner,
        }
    }
}

/// Format a 1-based registry index as a patient ID.
pub fn patient_id_for_index(index: usize) -> String {
    format!("P{:03}", index)
}

/// Demo patients an empty registry starts with.
pub fn seed_patients() -> Vec<Patient> {
    vec![
        Patient {
            id: "P001".into(),
            name: "Buddy".into(),
            species: Species::Dog,
            breed: "Golden Retriever".into(),
            age: 5,
            owner: "John Smith".into(),
        },
        Patient {
            id: "P002".into(),
            name: "Misty".into(),
            species: Species::Cat,
            breed: "Siamese".into(),
            age: 3,
            owner: "Emily Davis".into(),
        },
    ]
}
