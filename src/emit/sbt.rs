//! SBT `repositories` and `global.sbt`.

use std::fmt::Write;

use crate::core::{BackendKind, BuildEnvironment, CacheMirror};
use crate::emit::{ConfigEmitter, GeneratedConfig};

/// Name of the proxy repository entry pointing at the mirror.
pub const PROXY_REPOSITORY: &str = "mirror-proxy-releases";

/// One line of the `[repositories]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SbtRepository {
    /// The predefined `local` repository.
    Local,
    /// A named Maven-style repository.
    Maven { name: String, url: String },
}

/// Sbt launcher repository list, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repositories {
    entries: Vec<SbtRepository>,
}

impl Repositories {
    /// Local first, then the mirror proxy.
    pub fn for_mirror(mirror: &CacheMirror) -> Self {
        Repositories {
            entries: vec![
                SbtRepository::Local,
                SbtRepository::Maven {
                    name: PROXY_REPOSITORY.to_string(),
                    url: mirror.url.clone(),
                },
            ],
        }
    }

    pub fn entries(&self) -> &[SbtRepository] {
        &self.entries
    }

    pub fn render(&self) -> String {
        let mut out = String::from("[repositories]\n");
        for entry in &self.entries {
            let _ = match entry {
                SbtRepository::Local => writeln!(out, "  local"),
                SbtRepository::Maven { name, url } => writeln!(out, "  {}: {}", name, url),
            };
        }
        out
    }
}

/// A single `key := expression` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbtSetting {
    pub key: String,
    pub expr: String,
}

impl SbtSetting {
    /// `publishTo` pointing at a local Maven-layout directory.
    pub fn publish_to(url: &str) -> Self {
        SbtSetting {
            key: "publishTo".to_string(),
            expr: format!("Some(\"MavenRepo\" at \"{}\")", scala_escape(url)),
        }
    }

    pub fn render(&self) -> String {
        format!("{} := {}\n", self.key, self.expr)
    }
}

/// Escape text for a Scala string literal.
fn scala_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Emits the SBT launcher repositories and global settings.
pub struct SbtEmitter;

impl ConfigEmitter for SbtEmitter {
    fn backend(&self) -> BackendKind {
        BackendKind::Sbt
    }

    fn render(&self, env: &BuildEnvironment) -> Vec<GeneratedConfig> {
        let mut configs = Vec::new();

        if let Some(mirror) = env.mirror() {
            configs.push(GeneratedConfig::new(
                ".sbt/repositories",
                env.settings().sbt_repositories(),
                Repositories::for_mirror(mirror).render(),
            ));
        }

        configs.push(GeneratedConfig::new(
            ".sbt/1.0/global.sbt",
            env.settings().sbt_global(),
            SbtSetting::publish_to(&env.artifacts_url()).render(),
        ));

        configs
    }
}
