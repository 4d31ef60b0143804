//! Ivy `ivysettings.xml` for Ant builds.
//!
//! Only written when a mirror is configured. Ant builds without one keep
//! Ivy's stock resolvers.

use crate::core::{BackendKind, BuildEnvironment, CacheMirror};
use crate::emit::{ConfigEmitter, GeneratedConfig};
use crate::format::{XmlDocument, XmlElement};

/// Maven-layout pattern shared by every resolver in the chain.
pub const ARTIFACT_PATTERN: &str =
    "[organisation]/[module]/[revision]/[module]-[revision](-[classifier]).[ext]";

const CHAIN_RESOLVER: &str = "defaultChain";
const LOCAL_RESOLVER: &str = "local";
const MIRROR_RESOLVER: &str = "mirror";

/// Emits `ivysettings.xml`.
pub struct IvyEmitter;

impl ConfigEmitter for IvyEmitter {
    fn backend(&self) -> BackendKind {
        BackendKind::Ant
    }

    fn render(&self, env: &BuildEnvironment) -> Vec<GeneratedConfig> {
        let Some(mirror) = env.mirror() else {
            return Vec::new();
        };

        let local_root = env.settings().local_repository().display().to_string();
        vec![GeneratedConfig::new(
            "ivysettings.xml",
            env.settings().ivy_settings(),
            ivy_settings_document(mirror, &local_root).render(),
        )]
    }
}

/// Build the settings document.
///
/// The chain tries the local repository first so local hits never reach
/// the mirror.
pub fn ivy_settings_document(mirror: &CacheMirror, local_root: &str) -> XmlDocument {
    let local_pattern = format!("{}/{}", local_root.trim_end_matches('/'), ARTIFACT_PATTERN);

    let local = XmlElement::new("filesystem")
        .attr("name", LOCAL_RESOLVER)
        .attr("m2compatible", "true")
        .child(XmlElement::new("artifact").attr("pattern", local_pattern.as_str()))
        .child(XmlElement::new("ivy").attr("pattern", local_pattern.as_str()));

    let remote = XmlElement::new("ibiblio")
        .attr("name", MIRROR_RESOLVER)
        .attr("root", mirror.url.as_str())
        .attr("pattern", ARTIFACT_PATTERN)
        .attr("m2compatible", "true");

    let chain = XmlElement::new("chain")
        .attr("name", CHAIN_RESOLVER)
        .child(XmlElement::new("resolver").attr("ref", LOCAL_RESOLVER))
        .child(XmlElement::new("resolver").attr("ref", MIRROR_RESOLVER));

    XmlDocument::new(
        XmlElement::new("ivysettings")
            .child(XmlElement::new("settings").attr("defaultResolver", CHAIN_RESOLVER))
            .child(XmlElement::new("resolvers").child(local).child(remote).child(chain)),
    )
}
