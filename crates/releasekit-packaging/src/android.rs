//! Signed Android packages.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use releasekit_core::toolchain::{BuildKind, BuildRequest};
use releasekit_core::{Artifact, Error, Outcome, Project};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::context::BuildContext;

/// Extension of produced install packages.
const APK_PATTERN: &str = "*.apk";

/// Signing material for release APKs.
#[derive(Clone, Default)]
pub struct AndroidSigning {
    /// Keystore file, base64 encoded.
    pub keystore_base64: Option<String>,
    pub key_alias: Option<String>,
    pub key_pass: Option<String>,
    pub store_pass: Option<String>,
}

impl fmt::Debug for AndroidSigning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidSigning")
            .field("keystore_base64", &self.keystore_base64.as_ref().map(|_| "[REDACTED]"))
            .field("key_alias", &self.key_alias)
            .field("key_pass", &self.key_pass.as_ref().map(|_| "[REDACTED]"))
            .field("store_pass", &self.store_pass.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Signing values once checked for presence.
struct SigningValues<'a> {
    keystore: Vec<u8>,
    key_alias: &'a str,
    key_pass: &'a str,
    store_pass: &'a str,
}

impl AndroidSigning {
    /// Check all four values and decode the keystore.
    fn require(&self) -> Outcome<SigningValues<'_>> {
        fn present<'a>(value: &'a Option<String>, name: &str) -> Outcome<&'a str> {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::missing(name))
        }

        let keystore = present(&self.keystore_base64, "Android signing keystore")?;
        let key_alias = present(&self.key_alias, "Android signing key alias")?;
        let key_pass = present(&self.key_pass, "Android signing key password")?;
        let store_pass = present(&self.store_pass, "Android signing store password")?;

        let keystore = STANDARD
            .decode(keystore.trim())
            .map_err(|e| Error::missing(format!("Android signing keystore is not valid base64 ({})", e)))?;

        Ok(SigningValues {
            keystore,
            key_alias,
            key_pass,
            store_pass,
        })
    }
}

/// Produces signed APKs for one project.
#[derive(Debug, Clone, Default)]
pub struct AndroidPackage {
    pub signing: AndroidSigning,
}

impl AndroidPackage {
    pub fn new(signing: AndroidSigning) -> Self {
        Self { signing }
    }

    pub async fn produce(&self, project: &Project, ctx: &BuildContext) -> Outcome<Vec<Artifact>> {
        project.validate().await?;
        let signing = self.signing.require()?;

        let output_dir = ctx.output_dir();
        tokio::fs::create_dir_all(&output_dir).await?;

        // Removed when dropped, so the keystore never outlives this call.
        let mut keystore = tempfile::Builder::new()
            .prefix("signing-")
            .suffix(".keystore")
            .tempfile_in(&output_dir)?;
        keystore.write_all(&signing.keystore)?;
        keystore.flush()?;

        let publish_dir = ctx.publish_dir().join("android");
        let request = BuildRequest::new(
            BuildKind::Publish,
            &project.path,
            "Release",
            &publish_dir,
        )
        .property(
            "ApplicationVersion",
            ctx.version.commits_since_version_source.to_string(),
        )
        .property("ApplicationDisplayVersion", &ctx.version.major_minor_patch)
        .property("AndroidKeyStore", "true")
        .property(
            "AndroidSigningKeyStore",
            keystore.path().to_string_lossy(),
        )
        .property("AndroidSigningKeyAlias", signing.key_alias)
        .property("AndroidSigningStorePass", signing.store_pass)
        .property("AndroidSigningKeyPass", signing.key_pass);

        info!(project = %project.name, "Building signed Android package");
        let built = ctx.build_tool().build(&request).await;

        if let Err(e) = keystore.close() {
            warn!(error = %e, "Failed to delete signing keystore");
        }

        let output = built?;
        let packages = find_packages(&output)?;
        info!(project = %project.name, count = packages.len(), "Android packages produced");
        Ok(packages)
    }
}

fn find_packages(dir: &Path) -> Outcome<Vec<Artifact>> {
    let pattern = dir.join(APK_PATTERN);
    let pattern = pattern.to_string_lossy();

    let paths = glob::glob(&pattern)
        .map_err(|e| Error::Internal(format!("invalid pattern {}: {}", pattern, e)))?;

    let mut packages: Vec<Artifact> = paths
        .filter_map(|entry| entry.ok())
        .map(Artifact::from_path)
        .collect();
    packages.sort_by(|a, b| a.name.cmp(&b.name));

    if packages.is_empty() {
        return Err(Error::ArtifactNotFound(format!(
            "no {} files in {}",
            APK_PATTERN,
            dir.display()
        )));
    }

    Ok(packages)
}
