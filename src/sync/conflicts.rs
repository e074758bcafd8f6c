//! Saint number conflict detection across locations.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::SaintRecord;

/// A saint number seen again after its first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaintConflict {
    pub saint_number: String,
    /// Location where the saint number was first seen
    pub original_location: String,
    /// Location of the later occurrence
    pub conflicting_location: String,
}

impl fmt::Display for SaintConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original_location == self.conflicting_location {
            write!(
                f,
                "Saint number {} appears more than once in {}",
                self.saint_number, self.original_location
            )
        } else {
            write!(
                f,
                "Saint number {} already belongs to {} but also appears in {}",
                self.saint_number, self.original_location, self.conflicting_location
            )
        }
    }
}

/// Find saint numbers that occur more than once.
///
/// Input is `(location display name, saints)` in processing order. The first
/// occurrence owns the saint number; each later one is reported.
pub fn detect_conflicts<'a, I>(locations: I) -> Vec<SaintConflict>
where
    I: IntoIterator<Item = (&'a str, &'a [SaintRecord])>,
{
    let mut owners: HashMap<&'a str, &'a str> = HashMap::new();
    let mut conflicts = Vec::new();

    for (location, saints) in locations {
        for saint in saints {
            match owners.get(saint.saint_number.as_str()) {
                Some(owner) => conflicts.push(SaintConflict {
                    saint_number: saint.saint_number.clone(),
                    original_location: owner.to_string(),
                    conflicting_location: location.to_string(),
                }),
                None => {
                    owners.insert(saint.saint_number.as_str(), location);
                }
            }
        }
    }

    conflicts
}
