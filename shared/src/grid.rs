use std::time::Duration;

use crate::response::{AugmentationKind, AugmentationSet, ImageRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridSlot {
    pub kind: AugmentationKind,
    pub reference: ImageRef,
    pub state: SlotState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDownload {
    pub delay: Duration,
    pub url: String,
    pub filename: String,
}

/// The eight result cards of the augmentation page.
///
/// Each slot changes state on its own; a broken slot never fails the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentationGrid {
    slots: Vec<GridSlot>,
}

pub fn download_name(kind: AugmentationKind, timestamp_ms: u64) -> String {
    format!("augmented_{}_{}.png", kind.as_ref(), timestamp_ms)
}

impl AugmentationGrid {
    pub fn from_set(set: &AugmentationSet) -> Self {
        let slots = set
            .iter()
            .map(|(kind, reference)| GridSlot {
                kind: *kind,
                reference: reference.clone(),
                state: match reference {
                    ImageRef::Valid(_) => SlotState::Loading,
                    ImageRef::Missing => SlotState::Error,
                },
            })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[GridSlot] {
        &self.slots
    }

    pub fn slot(&self, kind: AugmentationKind) -> Option<&GridSlot> {
        self.slots.iter().find(|slot| slot.kind == kind)
    }

    pub fn mark_loaded(&mut self, kind: AugmentationKind) -> bool {
        self.settle(kind, SlotState::Loaded)
    }

    pub fn mark_failed(&mut self, kind: AugmentationKind) -> bool {
        self.settle(kind, SlotState::Error)
    }

    // Only a loading slot can settle, and only once.
    fn settle(&mut self, kind: AugmentationKind, state: SlotState) -> bool {
        match self.slots.iter_mut().find(|slot| slot.kind == kind) {
            Some(slot) if slot.state == SlotState::Loading => {
                slot.state = state;
                true
            }
            _ => false,
        }
    }

    pub fn count(&self, state: SlotState) -> usize {
        self.slots.iter().filter(|slot| slot.state == state).count()
    }

    pub fn downloadable(&self) -> impl Iterator<Item = &GridSlot> {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Loaded)
    }

    /// Downloads for "download all", spaced `stagger` apart in slot order.
    pub fn download_plan(&self, stagger: Duration, timestamp_ms: u64) -> Vec<PlannedDownload> {
        self.downloadable()
            .filter_map(|slot| slot.reference.url().map(|url| (slot.kind, url)))
            .enumerate()
            .map(|(index, (kind, url))| PlannedDownload {
                delay: stagger * index as u32,
                url: url.to_string(),
                filename: download_name(kind, timestamp_ms),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid_of_five() -> AugmentationGrid {
        let data = json!(["https://x/0.png", "https://x/1.png", "https://x/2.png", null, null]);
        AugmentationGrid::from_set(&AugmentationSet::from_payload(&data).unwrap())
    }

    #[test]
    fn short_payload_renders_three_loading_five_failed() {
        let grid = grid_of_five();
        assert_eq!(grid.slots().len(), 8);
        assert_eq!(grid.count(SlotState::Loading), 3);
        assert_eq!(grid.count(SlotState::Error), 5);
        assert_eq!(grid.slot(AugmentationKind::Rotation).unwrap().state, SlotState::Loading);
        assert_eq!(grid.slot(AugmentationKind::HeightShift).unwrap().state, SlotState::Error);
    }

    #[test]
    fn slots_settle_independently_and_once() {
        let mut grid = grid_of_five();
        assert!(grid.mark_loaded(AugmentationKind::Original));
        assert!(grid.mark_failed(AugmentationKind::Rotation));
        assert!(!grid.mark_loaded(AugmentationKind::Rotation));
        assert!(!grid.mark_loaded(AugmentationKind::Zoom));

        assert_eq!(grid.count(SlotState::Loaded), 1);
        assert_eq!(grid.count(SlotState::Loading), 1);
        assert_eq!(grid.count(SlotState::Error), 6);
    }

    #[test]
    fn download_names_follow_the_pattern() {
        assert_eq!(
            download_name(AugmentationKind::WidthShift, 1_700_000_000_000),
            "augmented_width_shift_1700000000000.png"
        );
    }

    #[test]
    fn download_all_staggers_loaded_slots() {
        let mut grid = grid_of_five();
        grid.mark_loaded(AugmentationKind::Original);
        grid.mark_loaded(AugmentationKind::WidthShift);

        let plan = grid.download_plan(Duration::from_millis(200), 42);
        assert_eq!(
            plan,
            vec![
                PlannedDownload {
                    delay: Duration::ZERO,
                    url: "https://x/0.png".into(),
                    filename: "augmented_original_42.png".into(),
                },
                PlannedDownload {
                    delay: Duration::from_millis(200),
                    url: "https://x/2.png".into(),
                    filename: "augmented_width_shift_42.png".into(),
                },
            ]
        );
    }

    #[test]
    fn nothing_loaded_means_nothing_to_download() {
        assert!(grid_of_five().download_plan(Duration::from_millis(200), 1).is_empty());
    }
}
