use std::sync::Arc;

use tokio::sync::watch;

use crate::models::AgronomicInput;

/// The most recent agronomic input that produced a successful prediction.
///
/// Written by the refresh and analysis flows, read by search. Clones share
/// the same slot.
#[derive(Debug, Clone)]
pub struct LastInputs {
    slot: Arc<watch::Sender<Option<AgronomicInput>>>,
}

impl LastInputs {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
        }
    }

    pub fn get(&self) -> Option<AgronomicInput> {
        *self.slot.borrow()
    }

    pub fn set(&self, input: AgronomicInput) {
        self.slot.send_replace(Some(input));
    }
}

impl Default for LastInputs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Season, SoilType};

    #[test]
    fn clones_share_slot() {
        let inputs = LastInputs::new();
        let reader = inputs.clone();
        assert_eq!(reader.get(), None);

        let input = AgronomicInput::fallback(Season::Second, SoilType::Sandy);
        inputs.set(input);
        assert_eq!(reader.get(), Some(input));
    }
}
