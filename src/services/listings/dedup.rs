use rustc_hash::FxHashSet;

/// Units already accepted during one run.
#[derive(Debug, Default)]
pub struct SeenUnits {
    units: FxHashSet<String>,
}

impl SeenUnits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, unit: &str) -> bool {
        !unit.is_empty() && self.units.contains(unit)
    }

    /// Records `unit` and reports whether it was new. An empty unit carries
    /// no identity, so it is always admitted and never remembered.
    pub fn admit(&mut self, unit: &str) -> bool {
        if unit.is_empty() {
            return true;
        }
        self.units.insert(unit.to_string())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }
}
