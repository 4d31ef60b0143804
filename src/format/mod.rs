//! Typed documents and their serializers.
//!
//! Emitters build one of these documents and never format text themselves.

pub mod properties;
pub mod xml;

pub use properties::Properties;
pub use xml::{XmlDocument, XmlElement};
