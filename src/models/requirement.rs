//! Enrollment requirement model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a requirement: one level taught at one branch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequirementKey {
    pub branch: String,
    pub level: String,
}

impl RequirementKey {
    /// Creates a key.
    pub fn new(branch: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            level: level.into(),
        }
    }
}

impl fmt::Display for RequirementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.branch, self.level)
    }
}

/// Demand for one (branch, level) pair.
///
/// `capacity` and `duration` are the class size and length implied by the
/// level; demand may need several classes to cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub branch: String,
    pub level: String,
    /// Students to place.
    pub students: u32,
    /// Max students per class of this level.
    pub capacity: u32,
    /// Class length in minutes.
    pub duration: u32,
}

impl Requirement {
    /// Creates a requirement.
    pub fn new(
        branch: impl Into<String>,
        level: impl Into<String>,
        students: u32,
        capacity: u32,
        duration: u32,
    ) -> Self {
        Self {
            branch: branch.into(),
            level: level.into(),
            students,
            capacity,
            duration,
        }
    }

    /// The (branch, level) key.
    pub fn key(&self) -> RequirementKey {
        RequirementKey::new(&self.branch, &self.level)
    }

    /// Minimum number of classes needed to seat all students.
    pub fn classes_needed(&self) -> u32 {
        if self.capacity == 0 {
            return 0;
        }
        self.students.div_ceil(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_needed() {
        assert_eq!(Requirement::new("BB", "L1", 20, 8, 90).classes_needed(), 3);
        assert_eq!(Requirement::new("BB", "L1", 8, 8, 90).classes_needed(), 1);
        assert_eq!(Requirement::new("BB", "L1", 5, 0, 90).classes_needed(), 0);
    }

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            RequirementKey::new("CH", "L1"),
            RequirementKey::new("BB", "L2"),
            RequirementKey::new("BB", "L1"),
        ];
        keys.sort();
        assert_eq!(keys[0], RequirementKey::new("BB", "L1"));
        assert_eq!(keys[2].to_string(), "CH L1");
    }
}
