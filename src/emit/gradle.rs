//! Gradle `gradle.properties` in an isolated user home.
//!
//! Gradle builds reach the mirror through their own repository blocks, so
//! nothing here references it. This file only loosens HTTP timeouts for a
//! slow mirror and neutralises publishing side effects.

use crate::core::{BackendKind, BuildEnvironment};
use crate::emit::{ConfigEmitter, GeneratedConfig};
use crate::format::Properties;

/// HTTP connection and socket timeout, in milliseconds.
pub const HTTP_TIMEOUT_MS: u32 = 600_000;

/// Placeholder credentials for builds that insist on non-empty values.
const DUMMY_CREDENTIAL: &str = "jbs";

/// Emits `gradle.properties`.
pub struct GradleEmitter;

impl ConfigEmitter for GradleEmitter {
    fn backend(&self) -> BackendKind {
        BackendKind::Gradle
    }

    fn render(&self, env: &BuildEnvironment) -> Vec<GeneratedConfig> {
        let props = gradle_properties(&env.artifacts_url());
        vec![GeneratedConfig::new(
            "gradle.properties",
            env.settings().gradle_properties(),
            props.render(),
        )]
    }
}

/// Build the properties document.
pub fn gradle_properties(artifacts_url: &str) -> Properties {
    let timeout = HTTP_TIMEOUT_MS.to_string();

    Properties::new()
        .set("org.gradle.console", "plain")
        .blank()
        .comment("Tolerate a slow local mirror")
        .set("systemProp.org.gradle.internal.http.connectionTimeout", &timeout)
        .set("systemProp.org.gradle.internal.http.socketTimeout", &timeout)
        .set("systemProp.http.socketTimeout", &timeout)
        .set("systemProp.http.connectionTimeout", &timeout)
        .blank()
        .comment("Publish releases into the artifacts directory, unsigned")
        .set("RELEASE_REPOSITORY_URL", artifacts_url)
        .set("RELEASE_SIGNING_ENABLED", "false")
        .set("mavenCentralUsername", "")
        .set("mavenCentralPassword", "")
        .blank()
        .comment("Builds that enforce non-empty credentials")
        .set("sonatypeUsername", DUMMY_CREDENTIAL)
        .set("sonatypePassword", DUMMY_CREDENTIAL)
}
