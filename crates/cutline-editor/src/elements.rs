//! Element constructors, text styling, effects, animations and the
//! interactive transform write-back.

use cutline_core::{EditorError, Placement, Rejection, Result, TimeFrame};
use cutline_playback::{FrameHost, MediaHost};
use cutline_timeline::{
    fit_scale, Animation, AudioProperties, EditorElement, Effect, ElementId, ElementKind,
    ElementProperties, FontStyle, ImageProperties, ObjectId, ObjectProps, ObjectSpec,
    RenderSurface, SkeletalKind, SvgProperties, TextProperties, VideoProperties,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::editing::reject;
use crate::session::EditorSession;

/// Height every new media element is placed at; width follows the aspect.
const MEDIA_HEIGHT: f64 = 100.0;

impl<S, M, F> EditorSession<S, M, F>
where
    S: RenderSurface,
    M: MediaHost,
    F: FrameHost,
{
    fn next_index(&self, kind: ElementKind) -> usize {
        self.model.iter().filter(|e| e.kind() == kind).count() + 1
    }

    /// Add a video backed by the media element `media_id`.
    pub fn add_video(
        &mut self,
        media_id: impl Into<String>,
        src: impl Into<String>,
        duration_ms: f64,
        aspect_ratio: f64,
    ) -> Result<ElementId> {
        let element = EditorElement::new(
            format!("Media(video) {}", self.next_index(ElementKind::Video)),
            TimeFrame::new(0.0, duration_ms.min(self.clock.max_time_ms())),
            Placement::new(0.0, 0.0, MEDIA_HEIGHT * aspect_ratio, MEDIA_HEIGHT),
            ElementProperties::Video(VideoProperties {
                element_id: media_id.into(),
                src: src.into(),
                effect: Effect::None,
            }),
        );
        self.add_element(element)
    }

    /// Add an image spanning the whole timeline.
    pub fn add_image(
        &mut self,
        src: impl Into<String>,
        natural_width: f64,
        natural_height: f64,
    ) -> Result<ElementId> {
        let aspect = fit_scale(natural_width, natural_height);
        let element = EditorElement::new(
            format!("Media(image) {}", self.next_index(ElementKind::Image)),
            TimeFrame::new(0.0, self.clock.max_time_ms()),
            Placement::new(0.0, 0.0, MEDIA_HEIGHT * aspect, MEDIA_HEIGHT),
            ElementProperties::Image(ImageProperties {
                element_id: format!("image-{}", Uuid::new_v4().simple()),
                src: src.into(),
                effect: Effect::None,
                natural_width,
                natural_height,
            }),
        );
        self.add_element(element)
    }

    pub fn add_audio(
        &mut self,
        media_id: impl Into<String>,
        src: impl Into<String>,
        duration_ms: f64,
    ) -> Result<ElementId> {
        let element = EditorElement::new(
            format!("Media(audio) {}", self.next_index(ElementKind::Audio)),
            TimeFrame::new(0.0, duration_ms.min(self.clock.max_time_ms())),
            Placement::new(0.0, 0.0, MEDIA_HEIGHT, MEDIA_HEIGHT),
            ElementProperties::Audio(AudioProperties {
                element_id: media_id.into(),
                src: src.into(),
            }),
        );
        self.add_element(element)
    }

    pub fn add_text(
        &mut self,
        text: impl Into<String>,
        font_size: f64,
        font_weight: u16,
    ) -> Result<ElementId> {
        let element = EditorElement::new(
            format!("Text {}", self.model.len() + 1),
            TimeFrame::new(0.0, self.clock.max_time_ms()),
            Placement::default(),
            ElementProperties::Text(TextProperties::new(text, font_size, font_weight)),
        );
        self.add_element(element)
    }

    /// Load an SVG and add it as an element.
    ///
    /// The group is loaded before the model changes, so a failed load
    /// leaves the session untouched.
    pub fn add_svg(&mut self, src: impl Into<String>) -> Result<ElementId> {
        let src = src.into();
        let placement = Placement::default();
        let spec = ObjectSpec::Svg { src: src.clone() };
        let object = match self
            .surface
            .create(spec, ObjectProps::from_placement(&placement))
        {
            Ok(object) => object,
            Err(err) => {
                warn!(src = %src, error = %err, "SVG load failed");
                return Err(err);
            }
        };

        let element = EditorElement::new(
            format!("Media(svg) {}", self.next_index(ElementKind::Svg)),
            TimeFrame::new(0.0, self.clock.max_time_ms()),
            placement,
            ElementProperties::Svg(SvgProperties {
                src,
                animation_type: None,
            }),
        );
        let id = element.id;
        self.model.add(element)?;
        self.objects.insert(id, object);
        self.refresh();
        Ok(id)
    }

    fn update_selected_text(&mut self, edit: impl FnOnce(&mut TextProperties)) -> Result<()> {
        let Some(mut element) = self.model.selected().cloned() else {
            return reject("text style", Rejection::NoSelection);
        };
        let ElementProperties::Text(text) = &mut element.properties else {
            return reject("text style", Rejection::NoSelection);
        };
        edit(text);
        self.update_element(element)
    }

    pub fn set_font_size(&mut self, font_size: f64) -> Result<()> {
        self.update_selected_text(|text| text.font_size = font_size)
    }

    pub fn set_text_color(&mut self, color: impl Into<String>) -> Result<()> {
        let color = color.into();
        self.update_selected_text(|text| text.text_color = color)
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) -> Result<()> {
        let family = family.into();
        self.update_selected_text(|text| text.font_family = family)
    }

    pub fn set_text_content(&mut self, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        self.update_selected_text(|text| text.text = content)
    }

    /// Flip the selected text between bold and normal weight.
    pub fn toggle_bold(&mut self) -> Result<()> {
        self.update_selected_text(|text| {
            text.font_weight = if text.is_bold() {
                TextProperties::NORMAL_WEIGHT
            } else {
                TextProperties::BOLD_WEIGHT
            };
        })
    }

    pub fn toggle_italic(&mut self) -> Result<()> {
        self.update_selected_text(|text| {
            text.font_style = match text.font_style {
                FontStyle::Normal => FontStyle::Italic,
                FontStyle::Italic => FontStyle::Normal,
            };
        })
    }

    /// Set the visual effect of a video or image element. Other kinds are
    /// left alone.
    pub fn update_effect(&mut self, id: ElementId, effect: Effect) -> Result<()> {
        let mut element = self
            .model
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::ResourceMissing(format!("element {id}")))?;
        let kind = element.kind();
        match &mut element.properties {
            ElementProperties::Video(video) => video.effect = effect,
            ElementProperties::Image(image) => image.effect = effect,
            _ => {
                debug!(element = %id, %kind, "Element has no effect slot");
                return Ok(());
            }
        }
        self.update_element(element)
    }

    /// Give the selected SVG a skeletal animation.
    ///
    /// Any running skeletal batch is cleared; the new one starts on the
    /// next `play`.
    pub fn assign_skeletal_to_selected_svg(&mut self, kind: SkeletalKind) -> Result<()> {
        let Some(mut element) = self.model.selected().cloned() else {
            return reject("assign skeletal", Rejection::InvalidSvgSelection);
        };
        let ElementProperties::Svg(svg) = &mut element.properties else {
            return reject("assign skeletal", Rejection::InvalidSvgSelection);
        };
        svg.animation_type = Some(kind);
        self.driver.clear_skeletal(&mut self.surface);
        info!(element = %element.id, kind = ?kind, "Skeletal animation assigned");
        self.update_element(element)
    }

    pub fn add_animation(&mut self, animation: Animation) -> Uuid {
        let id = animation.id;
        debug!(animation = %id, target = %animation.target_id, "Animation added");
        self.animations.push(animation);
        self.refresh();
        id
    }

    /// Replace the animation `id`, keeping its id.
    pub fn update_animation(&mut self, id: Uuid, animation: Animation) -> Result<()> {
        let Some(slot) = self.animations.iter_mut().find(|a| a.id == id) else {
            return reject("update animation", Rejection::UnknownAnimation);
        };
        *slot = Animation { id, ..animation };
        self.refresh();
        Ok(())
    }

    pub fn remove_animation(&mut self, id: Uuid) -> Result<Animation> {
        let Some(index) = self.animations.iter().position(|a| a.id == id) else {
            return reject("remove animation", Rejection::UnknownAnimation);
        };
        let removed = self.animations.remove(index);
        self.refresh();
        Ok(removed)
    }

    /// Fold an interactive transform of `object` back into its element.
    pub fn on_object_modified(&mut self, object: ObjectId) -> Result<()> {
        let id = self
            .objects
            .element_for(object)
            .ok_or_else(|| EditorError::ResourceMissing(format!("no element for {object}")))?;
        let props = self
            .surface
            .props(object)
            .ok_or_else(|| EditorError::ResourceMissing(object.to_string()))?;
        let mut element = self
            .model
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::ResourceMissing(format!("element {id}")))?;

        let placement = &mut element.placement;
        placement.x = props.left;
        placement.y = props.top;
        placement.rotation = props.angle;
        match &element.properties {
            ElementProperties::Video(_) => {
                placement.width = props.width * props.scale_x;
                placement.height = props.height * props.scale_y;
                placement.scale_x = 1.0;
                placement.scale_y = 1.0;
            }
            ElementProperties::Image(image) => {
                let fit = fit_scale(placement.width, image.natural_width);
                let scale = if fit > 0.0 { props.scale_x / fit } else { 1.0 };
                placement.scale_x = scale;
                placement.scale_y = scale;
            }
            ElementProperties::Text(_) => {
                placement.width = props.width;
                placement.height = props.height;
                placement.scale_x = props.scale_x;
                placement.scale_y = props.scale_y;
            }
            ElementProperties::Audio(_) | ElementProperties::Svg(_) => {
                placement.scale_x = props.scale_x;
                placement.scale_y = props.scale_y;
            }
        }
        debug!(element = %id, "Transform written back");
        self.update_element(element)
    }
}
