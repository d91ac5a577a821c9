//! The page host: the pieces a browser would provide.
//!
//! The renderer never reaches for globals. It is handed a [`Host`] holding
//! a [`Document`] (the canvas and input elements, looked up by id), an
//! [`ImageLoader`] and, when the platform has one, a [`Geolocation`].

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::PtimeError;
use crate::location::Coordinates;

pub const CANVAS_ID: &str = "earthViz";
pub const LATITUDE_INPUT: &str = "latitude-input";
pub const LONGITUDE_INPUT: &str = "longitude-input";
pub const DATE_INPUT: &str = "date-input";
pub const ZONE_INPUT: &str = "zone-input";

/// Fill colour, size and family for [`Canvas::fill_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub fill: Rgba<u8>,
    pub size_px: f32,
    pub family: &'static str,
}

impl TextStyle {
    /// White 20px serif.
    pub const OVERLAY: TextStyle = TextStyle {
        fill: Rgba([255, 255, 255, 255]),
        size_px: 20.0,
        family: "serif",
    };
}

/// A 2D drawing target.
pub trait Canvas: Send {
    /// Draw `image` with its top-left corner at (`x`, `y`), at natural size.
    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64);

    /// Draw `text` with its alphabetic baseline starting at (`x`, `y`).
    fn fill_text(&mut self, text: &str, x: i64, y: i64, style: &TextStyle);
}

/// Fetches and decodes an image resource.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, src: &str) -> Result<RgbaImage, PtimeError>;
}

/// The platform's location capability.
#[async_trait]
pub trait Geolocation: Send + Sync {
    /// Current position, or `None` if the request was denied or failed.
    async fn current_position(&self) -> Option<Coordinates>;
}

/// Text inputs present on the page, keyed by element id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs(BTreeMap<String, String>);

impl Inputs {
    pub fn with(mut self, id: &str) -> Self {
        self.0.insert(id.to_string(), String::new());
        self
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Set an existing input's value. Returns false if no such element.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.0.get_mut(id) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => {
                log::warn!("no input element #{}", id);
                false
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Elements of one page view.
pub struct Document<C> {
    canvases: HashMap<String, C>,
    pub inputs: Inputs,
}

impl<C: Canvas> Document<C> {
    pub fn new() -> Self {
        Self {
            canvases: HashMap::new(),
            inputs: Inputs::default(),
        }
    }

    /// The markup the page scripts expect: the earth canvas and four inputs.
    pub fn page(canvas: C) -> Self {
        Self::new().with_canvas(CANVAS_ID, canvas).with_inputs(&[
            LATITUDE_INPUT,
            LONGITUDE_INPUT,
            DATE_INPUT,
            ZONE_INPUT,
        ])
    }

    pub fn with_canvas(mut self, id: &str, canvas: C) -> Self {
        self.canvases.insert(id.to_string(), canvas);
        self
    }

    pub fn with_inputs(mut self, ids: &[&str]) -> Self {
        for id in ids {
            self.inputs = std::mem::take(&mut self.inputs).with(id);
        }
        self
    }

    pub fn canvas(&self, id: &str) -> Option<&C> {
        self.canvases.get(id)
    }

    pub fn take_canvas(&mut self, id: &str) -> Option<C> {
        self.canvases.remove(id)
    }

    /// Borrow a canvas and the inputs at the same time.
    pub fn split_mut(&mut self, canvas_id: &str) -> (Option<&mut C>, &mut Inputs) {
        (self.canvases.get_mut(canvas_id), &mut self.inputs)
    }
}

impl<C: Canvas> Default for Document<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one page view can reach.
pub struct Host<C> {
    pub document: Document<C>,
    pub images: Arc<dyn ImageLoader>,
    /// `None` when the platform has no location capability.
    pub geolocation: Option<Arc<dyn Geolocation>>,
}

impl<C: Canvas> Host<C> {
    pub fn new(document: Document<C>, images: Arc<dyn ImageLoader>) -> Self {
        Self {
            document,
            images,
            geolocation: None,
        }
    }

    pub fn with_geolocation(mut self, geolocation: Arc<dyn Geolocation>) -> Self {
        self.geolocation = Some(geolocation);
        self
    }
}
