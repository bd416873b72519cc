//! Naming of chain members.

use std::fmt;

use object_store::path::Path;

/// Names one member of a chain: the logical name the source must carry and
/// the location of its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    name: String,
    location: Path,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, location: impl Into<Path>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_carry_name_and_location() {
        let spec = SourceSpec::new("events", "staging/run1.ntc");
        assert_eq!(spec.name(), "events");
        assert_eq!(spec.location().as_ref(), "staging/run1.ntc");
        assert_eq!(spec.to_string(), "events (staging/run1.ntc)");
    }
}
