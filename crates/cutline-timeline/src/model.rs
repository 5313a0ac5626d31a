//! Authoritative element collection and selection.

use cutline_core::{EditorError, Result, TimeFrame, TimeFramePatch};
use tracing::debug;

use crate::element::{EditorElement, ElementId};

/// Ordered element list (bottom to top) plus the single selection.
///
/// Selection is stored as an id and re-derived after every list change, so
/// it can never point at an element that no longer exists.
#[derive(Debug, Clone, Default)]
pub struct ElementModel {
    elements: Vec<EditorElement>,
    selected: Option<ElementId>,
}

impl ElementModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[EditorElement] {
        &self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditorElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&EditorElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Append an element and select it.
    pub fn add(&mut self, element: EditorElement) -> Result<()> {
        if self.get(element.id).is_some() {
            return Err(EditorError::InvariantViolation(format!(
                "duplicate element id {}",
                element.id
            )));
        }
        debug!(element = %element.id, kind = %element.kind(), "Element added");
        self.selected = Some(element.id);
        self.elements.push(element);
        Ok(())
    }

    /// Remove an element by id, returning it.
    pub fn remove(&mut self, id: ElementId) -> Option<EditorElement> {
        let index = self.position(id)?;
        let removed = self.elements.remove(index);
        self.rederive_selection();
        debug!(element = %id, "Element removed");
        Some(removed)
    }

    /// Replace the element with the same id.
    pub fn update(&mut self, element: EditorElement) -> Result<()> {
        let index = self
            .position(element.id)
            .ok_or_else(|| EditorError::ResourceMissing(format!("element {}", element.id)))?;
        self.elements[index] = element;
        self.rederive_selection();
        Ok(())
    }

    /// Replace the whole list.
    pub fn set_elements(&mut self, elements: Vec<EditorElement>) {
        self.elements = elements;
        self.rederive_selection();
    }

    /// Move the element at `from` to `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.elements.len();
        if from >= len || to >= len {
            return Err(EditorError::InvariantViolation(format!(
                "reorder {from} -> {to} out of bounds for {len} elements"
            )));
        }
        let element = self.elements.remove(from);
        self.elements.insert(to, element);
        Ok(())
    }

    /// Merge a partial timeframe into an element, clamped to `[0, max_time]`.
    pub fn set_time_frame(
        &mut self,
        id: ElementId,
        patch: TimeFramePatch,
        max_time: f64,
    ) -> Result<TimeFrame> {
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| EditorError::ResourceMissing(format!("element {id}")))?;
        element.time_frame = element.time_frame.merged(patch, max_time);
        Ok(element.time_frame)
    }

    /// Clamp every element end to a (possibly shorter) timeline length.
    ///
    /// An element that starts at or past the new end slides back so that it
    /// ends at `max_time`, keeping its duration where the timeline allows.
    pub fn clamp_to(&mut self, max_time: f64) {
        for element in &mut self.elements {
            let frame = element.time_frame;
            let mut clamped = frame.merged(TimeFramePatch::end(frame.end), max_time);
            if clamped.start >= clamped.end {
                clamped.start = (max_time - frame.duration()).max(0.0);
                debug!(
                    element = %element.id,
                    start = clamped.start,
                    "Element slid into shorter timeline"
                );
            }
            element.time_frame = clamped;
        }
    }

    /// Select an element by id; unknown ids clear the selection.
    pub fn select(&mut self, id: Option<ElementId>) -> Option<&EditorElement> {
        self.selected = id.filter(|id| self.get(*id).is_some());
        self.selected()
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&EditorElement> {
        self.selected.and_then(|id| self.get(id))
    }

    fn rederive_selection(&mut self) {
        if let Some(id) = self.selected {
            if self.get(id).is_none() {
                self.selected = None;
            }
        }
    }
}
