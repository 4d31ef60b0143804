//! Maven `settings.xml` and `toolchains.xml`.

use crate::core::{BackendKind, BuildEnvironment, CacheMirror, ToolchainSet};
use crate::emit::{ConfigEmitter, GeneratedConfig};
use crate::format::{XmlDocument, XmlElement};

/// Id of the always-active profile exposing the artifacts directory.
pub const SECONDARY_PROFILE: &str = "secondary";

const MIRROR_ID: &str = "mirror.default";
const ARTIFACTS_REPOSITORY_ID: &str = "artifacts";

/// Emits Maven settings and toolchains.
pub struct MavenEmitter;

impl ConfigEmitter for MavenEmitter {
    fn backend(&self) -> BackendKind {
        BackendKind::Maven
    }

    fn render(&self, env: &BuildEnvironment) -> Vec<GeneratedConfig> {
        let artifacts_url = format!("file://{}", env.workspace().artifacts.display());
        let settings = settings_document(env.mirror(), &artifacts_url);
        let toolchains = toolchains_document(env.toolchains());

        vec![
            GeneratedConfig::new(
                "settings.xml",
                env.settings().maven_settings(),
                settings.render(),
            ),
            GeneratedConfig::new(
                "toolchains.xml",
                env.settings().maven_toolchains(),
                toolchains.render(),
            ),
        ]
    }
}

/// Build `settings.xml`.
///
/// With a mirror, every repository (`mirrorOf` `*`) is routed through it.
/// The `secondary` profile lets a later stage of the same job consume what
/// an earlier stage deployed to the artifacts directory.
pub fn settings_document(mirror: Option<&CacheMirror>, artifacts_url: &str) -> XmlDocument {
    let mut root = XmlElement::new("settings");

    if let Some(mirror) = mirror {
        root = root.child(
            XmlElement::new("mirrors").child(
                XmlElement::new("mirror")
                    .child_text("id", MIRROR_ID)
                    .child_text("url", mirror.url.as_str())
                    .child_text("mirrorOf", "*"),
            ),
        );
    }

    let profile = XmlElement::new("profile")
        .child_text("id", SECONDARY_PROFILE)
        .child(XmlElement::new("activation").child_text("activeByDefault", "true"))
        .child(XmlElement::new("repositories").child(local_repository("repository", artifacts_url)))
        .child(
            XmlElement::new("pluginRepositories")
                .child(local_repository("pluginRepository", artifacts_url)),
        );

    root = root.child(XmlElement::new("profiles").child(profile));

    XmlDocument::new(root)
}

/// Releases only, checksums ignored.
fn local_repository(element: &str, url: &str) -> XmlElement {
    XmlElement::new(element)
        .child_text("id", ARTIFACTS_REPOSITORY_ID)
        .child_text("url", url)
        .child(
            XmlElement::new("releases")
                .child_text("enabled", "true")
                .child_text("checksumPolicy", "ignore"),
        )
        .child(XmlElement::new("snapshots").child_text("enabled", "false"))
}

/// Build `toolchains.xml` with one JDK toolchain per entry, in set order.
pub fn toolchains_document(set: &ToolchainSet) -> XmlDocument {
    let toolchains = set.entries().iter().map(|entry| {
        XmlElement::new("toolchain")
            .child_text("type", "jdk")
            .child(XmlElement::new("provides").child_text("version", entry.version.as_str()))
            .child(
                XmlElement::new("configuration")
                    .child_text("jdkHome", entry.jdk_home.display().to_string()),
            )
    });

    XmlDocument::new(XmlElement::new("toolchains").children(toolchains))
}
