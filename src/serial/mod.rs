//! Markup rendering.
//!
//! Serializes a node, or a node's children, from a `Document` back to
//! markup text.

pub mod markup;

pub use markup::{render, render_document, render_inner, RenderOptions};
