//! Secrets read from the environment.
//!
//! Absent or blank variables stay `None`; the packaging tasks that need a
//! value report it as a missing parameter themselves.

use std::fmt;

pub const ANDROID_KEYSTORE_VAR: &str = "ANDROID_KEYSTORE_BASE64";
pub const ANDROID_KEY_ALIAS_VAR: &str = "ANDROID_SIGNING_KEY_ALIAS";
pub const ANDROID_KEY_PASS_VAR: &str = "ANDROID_SIGNING_KEY_PASS";
pub const ANDROID_STORE_PASS_VAR: &str = "ANDROID_SIGNING_STORE_PASS";
pub const NUGET_API_KEY_VAR: &str = "NUGET_API_KEY";
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Credentials used by signing and publishing steps.
#[derive(Clone, Default)]
pub struct Secrets {
    pub android_keystore_base64: Option<String>,
    pub android_key_alias: Option<String>,
    pub android_key_pass: Option<String>,
    pub android_store_pass: Option<String>,
    pub nuget_api_key: Option<String>,
    pub github_token: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            android_keystore_base64: read(ANDROID_KEYSTORE_VAR),
            android_key_alias: read(ANDROID_KEY_ALIAS_VAR),
            android_key_pass: read(ANDROID_KEY_PASS_VAR),
            android_store_pass: read(ANDROID_STORE_PASS_VAR),
            nuget_api_key: read(NUGET_API_KEY_VAR),
            github_token: read(GITHUB_TOKEN_VAR),
        }
    }
}

fn read(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "[REDACTED]" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("android_keystore_base64", &mask(&self.android_keystore_base64))
            .field("android_key_alias", &mask(&self.android_key_alias))
            .field("android_key_pass", &mask(&self.android_key_pass))
            .field("android_store_pass", &mask(&self.android_store_pass))
            .field("nuget_api_key", &mask(&self.nuget_api_key))
            .field("github_token", &mask(&self.github_token))
            .finish()
    }
}
