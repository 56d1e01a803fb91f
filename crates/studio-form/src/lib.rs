//! # studio-form
//!
//! Client-side half of studio: turns a [`ModelDescriptor`](studio_models::ModelDescriptor)
//! into an editable form, the form into a [`GenerationRequest`], and the
//! relay's answer into a [`View`].
//!
//! ```
//! use studio_form::{FormState, build};
//! use studio_models::Registry;
//!
//! let registry = Registry::builtin();
//! let model = registry.lookup("lcm-sdxl").expect("built in");
//!
//! let mut form = FormState::from_descriptor(model);
//! form.set_prompt("a lighthouse at dusk").expect("has a prompt");
//! form.set("num_outputs", 2).expect("numeric field");
//!
//! let request = build(model, &form).expect("valid form");
//! assert_eq!(request.input["num_outputs"], 2);
//! ```

pub mod builder;
pub mod error;
pub mod form;
pub mod render;
pub mod session;
pub mod widget;

pub use builder::{GenerationRequest, PROMPT_MAX_CHARS, build, validate_prompt};
pub use error::{FormError, SessionError, ValidationError};
pub use form::{FormState, MAX_REFERENCES, MeterLevel, PromptMeter};
pub use render::{ImageGrid, ImageTile, View, render};
pub use session::{GenerationResult, GenerationSession, InFlight};
pub use widget::{FieldWidget, FormLayout, PromptWidget, Widget, humanize, layout};
