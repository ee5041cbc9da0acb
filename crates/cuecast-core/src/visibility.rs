//! Hover flag gating the metadata overlay

/// Pointer-hover state. `activate` and `deactivate` set the flag
/// unconditionally; there is no toggling or debouncing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityGate {
    active: bool,
}

impl VisibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer entered the player container
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Pointer left the player container
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_inactive() {
        assert!(!VisibilityGate::new().is_active());
    }

    #[test]
    fn test_set_not_toggle() {
        let mut gate = VisibilityGate::new();
        gate.activate();
        gate.activate();
        assert!(gate.is_active());

        gate.deactivate();
        gate.deactivate();
        assert!(!gate.is_active());
    }
}
