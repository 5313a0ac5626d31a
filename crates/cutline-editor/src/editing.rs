//! Model mutations, selection and the clipboard operations.
//!
//! Rejected actions log a warning and return
//! [`EditorError::ActionRejected`] with the session left untouched.

use cutline_core::{EditorError, Rejection, Result, TimeFrame, TimeFramePatch};
use cutline_playback::{FrameHost, MediaHost};
use cutline_timeline::{EditorElement, ElementId, ObjectId, RenderSurface};
use tracing::{error, info, warn};

use crate::session::EditorSession;
use crate::{MIN_SPLIT_DURATION_MS, PASTE_OFFSET};

/// The single clipboard slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub element: EditorElement,
    /// Detached render object travelling with the element.
    pub object: Option<ObjectId>,
}

pub(crate) fn reject<T>(action: &'static str, rejection: Rejection) -> Result<T> {
    warn!(action, %rejection, "Action rejected");
    Err(EditorError::ActionRejected(rejection))
}

impl<S, M, F> EditorSession<S, M, F>
where
    S: RenderSurface,
    M: MediaHost,
    F: FrameHost,
{
    /// Append an element, select it and refresh.
    pub fn add_element(&mut self, element: EditorElement) -> Result<ElementId> {
        let id = element.id;
        self.model.add(element)?;
        self.refresh();
        Ok(id)
    }

    pub fn remove_element(&mut self, id: ElementId) -> Option<EditorElement> {
        let removed = self.model.remove(id)?;
        self.refresh();
        Some(removed)
    }

    /// Replace the element with the same id and refresh.
    pub fn update_element(&mut self, element: EditorElement) -> Result<()> {
        self.model.update(element)?;
        self.refresh();
        Ok(())
    }

    /// Replace the whole element list.
    pub fn set_elements(&mut self, elements: Vec<EditorElement>) {
        self.model.set_elements(elements);
        self.refresh();
    }

    /// Merge a clamped partial timeframe into an element.
    ///
    /// Media is resynced against the new range before the surface and the
    /// animation timeline are rebuilt.
    pub fn set_time_frame(&mut self, id: ElementId, patch: TimeFramePatch) -> Result<TimeFrame> {
        let frame = self
            .model
            .set_time_frame(id, patch, self.clock.max_time_ms())?;
        let at = self.clock.current_time_ms();
        self.driver.resync_media(&self.model, &mut self.media, at);
        self.refresh();
        Ok(frame)
    }

    /// Move the element at `from` to `to`, restacking its render object.
    ///
    /// Both render objects must be on the surface; otherwise nothing moves
    /// and an invariant violation is returned.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let elements = self.model.elements();
        let (Some(dragged), Some(hovered)) = (elements.get(from), elements.get(to)) else {
            return Err(EditorError::InvariantViolation(format!(
                "reorder {from} -> {to} out of bounds for {} elements",
                elements.len()
            )));
        };

        let stack = self.surface.objects();
        let locate = |id: ElementId| {
            let object = self.objects.get(id)?;
            let index = stack.iter().position(|o| *o == object)?;
            Some((object, index))
        };
        let (Some((dragged_object, _)), Some((_, hovered_index))) =
            (locate(dragged.id), locate(hovered.id))
        else {
            error!(from, to, "Render objects for reorder not on the surface");
            return Err(EditorError::InvariantViolation(format!(
                "cannot locate render objects for reorder {from} -> {to}"
            )));
        };

        self.model.reorder(from, to)?;
        self.surface.move_to(dragged_object, hovered_index);
        self.refresh();
        Ok(())
    }

    /// Select an element by id; `None` or an unknown id clears the selection.
    pub fn select(&mut self, id: Option<ElementId>) {
        let selected = self.model.select(id).map(|e| e.id);
        let active = selected.and_then(|id| self.objects.get(id));
        self.surface.set_active(active);
    }

    /// Selection coming from the surface (a click on a render object).
    pub fn select_object(&mut self, object: Option<ObjectId>) {
        let element = object.and_then(|o| self.objects.element_for(o));
        self.select(element);
    }

    /// Move the selected element to the clipboard.
    ///
    /// An occupied clipboard is overwritten with a warning.
    pub fn cut(&mut self) -> Result<ElementId> {
        let Some(element) = self.model.selected().cloned() else {
            return reject("cut", Rejection::NoSelection);
        };
        if let Some(previous) = self.clipboard.take() {
            warn!(element = %previous.element.id, "Clipboard occupied, overwriting");
            if let Some(object) = previous.object {
                self.surface.discard(object);
            }
        }

        let id = element.id;
        let object = self.objects.remove(id);
        if let Some(object) = object {
            self.surface.remove(object);
        }
        self.model.remove(id);
        self.model.select(None);
        self.surface.set_active(None);
        self.clipboard = Some(ClipboardEntry { element, object });
        self.refresh();
        info!(element = %id, "Element cut");
        Ok(id)
    }

    /// Put a copy of the selected element on the clipboard.
    ///
    /// Unlike [`cut`](Self::cut), an occupied clipboard is not overwritten.
    pub fn copy(&mut self) -> Result<()> {
        let Some(element) = self.model.selected() else {
            return reject("copy", Rejection::NoSelection);
        };
        if self.clipboard.is_some() {
            return reject("copy", Rejection::ClipboardOccupied);
        }

        let object = match self.objects.get(element.id) {
            Some(source) => {
                let copy = self.surface.clone_object(source)?;
                if let Some(props) = self.surface.props_mut(copy) {
                    props.left = element.placement.x;
                    props.top = element.placement.y;
                }
                Some(copy)
            }
            None => None,
        };
        let copied = element.duplicate(format!("Layer ({})", element.id));
        info!(source = %element.id, copy = %copied.id, "Element copied");
        self.clipboard = Some(ClipboardEntry {
            element: copied,
            object,
        });
        Ok(())
    }

    /// Add the clipboard element back, offset, under a fresh id.
    ///
    /// The clipboard is emptied. Video and audio get their own backing
    /// media element.
    pub fn paste(&mut self) -> Result<ElementId> {
        let Some(entry) = self.clipboard.take() else {
            return reject("paste", Rejection::ClipboardEmpty);
        };

        let mut element = entry.element.duplicate(entry.element.name.clone());
        element.placement = element.placement.translated(PASTE_OFFSET.0, PASTE_OFFSET.1);
        self.reallocate_media(&mut element);

        let object = entry
            .object
            .and_then(|source| self.clone_for(source, &element));
        if let Some(source) = entry.object {
            self.surface.discard(source);
        }

        let id = element.id;
        self.model.add(element)?;
        if let Some(object) = object {
            self.objects.insert(id, object);
            self.surface.add(object);
        }
        self.refresh();
        info!(element = %id, "Element pasted");
        Ok(id)
    }

    /// Cut the selected element in two at the midpoint of its timeframe.
    ///
    /// The original keeps `[start, mid]`; a new offset element covers
    /// `[mid, end]` and becomes selected.
    pub fn split(&mut self) -> Result<ElementId> {
        let Some(original) = self.model.selected().cloned() else {
            return reject("split", Rejection::NoSelection);
        };
        let frame = original.time_frame;
        let duration_ms = frame.duration();
        if duration_ms < MIN_SPLIT_DURATION_MS {
            return reject("split", Rejection::TooShortToSplit { duration_ms });
        }
        let mid = ((frame.start + frame.end) / 2.0).floor();

        let mut second = original.duplicate(format!("Layer ({})", original.id));
        second.placement = original
            .placement
            .translated(PASTE_OFFSET.0, PASTE_OFFSET.1);
        second.time_frame = TimeFrame::new(mid, frame.end);
        let object = self
            .objects
            .get(original.id)
            .and_then(|source| self.clone_for(source, &second));

        self.set_time_frame(original.id, TimeFramePatch::end(mid))?;
        self.reallocate_media(&mut second);

        let id = second.id;
        self.model.add(second)?;
        if let Some(object) = object {
            self.objects.insert(id, object);
            self.surface.add(object);
        }
        self.refresh();
        info!(original = %original.id, element = %id, mid, "Element split");
        Ok(id)
    }

    /// Remove the selected element and its render object.
    pub fn delete(&mut self) -> Result<EditorElement> {
        let Some(id) = self.model.selected_id() else {
            return reject("delete", Rejection::NoSelection);
        };
        if let Some(object) = self.objects.remove(id) {
            self.surface.discard(object);
        }
        let removed = self
            .model
            .remove(id)
            .ok_or_else(|| EditorError::ResourceMissing(format!("element {id}")))?;
        self.model.select(None);
        self.surface.set_active(None);
        self.surface.render_all();
        self.refresh();
        info!(element = %id, "Element deleted");
        Ok(removed)
    }

    /// Detached clone of `source` positioned at `element`'s placement.
    fn clone_for(&mut self, source: ObjectId, element: &EditorElement) -> Option<ObjectId> {
        match self.surface.clone_object(source) {
            Ok(copy) => {
                if let Some(props) = self.surface.props_mut(copy) {
                    props.left = element.placement.x;
                    props.top = element.placement.y;
                }
                Some(copy)
            }
            Err(err) => {
                warn!(element = %element.id, error = %err, "Cannot clone render object");
                None
            }
        }
    }

    /// Give a video or audio element its own backing media element.
    fn reallocate_media(&mut self, element: &mut EditorElement) {
        let Some(media_id) = element.media_id().map(str::to_owned) else {
            return;
        };
        match self.media.duplicate(&media_id) {
            Ok(copy) => element.set_media_id(copy),
            Err(err) => warn!(
                element = %element.id,
                media = %media_id,
                error = %err,
                "Cannot allocate backing media, sharing the original"
            ),
        }
    }
}
