//! # studio-models
//!
//! The model catalog for studio: a static table of hosted generation models
//! and the parameter schema each one accepts.
//!
//! This crate lets you:
//!
//! - **Look up models** by their stable catalog id (`"sdxl"`, `"lcm-sdxl"`, ...).
//! - **Describe parameters** with [`FieldSpec`], a closed union over the value
//!   types a form can edit (string, integer, float).
//! - **Compose and validate model paths** of the form `owner/model[:version]`.
//! - **Classify fields** (prompt, output count, reference image) through a
//!   single function, [`role::classify`].
//!
//! # Quick start
//!
//! ```
//! use studio_models::{OutputKind, Registry};
//!
//! let registry = Registry::builtin();
//! let sdxl = registry.lookup("sdxl").expect("sdxl is built in");
//!
//! assert_eq!(sdxl.output_kind, OutputKind::Image);
//! assert!(sdxl.model_path().starts_with("stability-ai/sdxl:"));
//! ```

pub mod catalog;
pub mod error;
pub mod path;
pub mod registry;
pub mod role;
pub mod spec;
pub mod value;

pub use error::Error;
pub use path::ModelPath;
pub use registry::Registry;
pub use role::{FieldClass, FieldRole, classify};
pub use spec::{FieldKind, FieldSpec, InputField, InputFields, ModelDescriptor, OutputKind, ValueType};
pub use value::FieldValue;
