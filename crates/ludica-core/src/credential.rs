//! API credential lookup.
//!
//! The credential is looked up at the start of every generation call and
//! never cached, so rotating it in the hosting environment takes effect on
//! the next request.

use std::fmt;

/// Secret used to authenticate against the model service.
///
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret value. Returns `None` for empty or whitespace-only input.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(secret.trim().to_owned()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Where the generator obtains its credential on each call.
pub trait CredentialSource: Send + Sync {
    /// Look up the current credential, or `None` if none is configured.
    fn lookup(&self) -> Option<Credential>;

    /// Where the credential is expected, e.g. the variable names to set.
    /// Language-neutral; callers embed it in their own messages.
    fn describe(&self) -> String;
}

/// Reads the credential from an ordered list of environment variables.
///
/// The first variable holding a non-blank value wins.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    vars: Vec<String>,
    read_var: fn(&str) -> Option<String>,
}

fn read_process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

impl EnvCredentials {
    /// Variables consulted when none are configured.
    pub const DEFAULT_VARS: [&str; 3] = ["LUDICA_API_KEY", "GEMINI_API_KEY", "API_KEY"];

    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
            read_var: read_process_env,
        }
    }

    /// Read variables through `read_var` instead of the process environment.
    #[cfg(test)]
    pub(crate) fn with_reader(mut self, read_var: fn(&str) -> Option<String>) -> Self {
        self.read_var = read_var;
        self
    }

    pub fn vars(&self) -> &[String] {
        &self.vars
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VARS)
    }
}

impl CredentialSource for EnvCredentials {
    fn lookup(&self) -> Option<Credential> {
        self.vars
            .iter()
            .find_map(|var| (self.read_var)(var).and_then(Credential::new))
    }

    /// The variable names, in lookup order.
    fn describe(&self) -> String {
        if self.vars.is_empty() {
            "-".to_string()
        } else {
            self.vars.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn credential_rejects_blank_and_trims() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        assert_eq!(Credential::new(" abc \n").unwrap().expose(), "abc");
    }

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::new("super-secret").unwrap();
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains("super-secret"), "leaked: {dbg}");
    }

    static FAKE_ENV: Mutex<BTreeMap<&'static str, &'static str>> = Mutex::new(BTreeMap::new());

    fn read_fake_env(var: &str) -> Option<String> {
        FAKE_ENV.lock().unwrap().get(var).map(|v| v.to_string())
    }

    fn set_fake(var: &'static str, value: Option<&'static str>) {
        let mut env = FAKE_ENV.lock().unwrap();
        match value {
            Some(v) => env.insert(var, v),
            None => env.remove(var),
        };
    }

    #[test]
    fn env_lookup_is_fresh_and_ordered() {
        let source = EnvCredentials::new(["FIRST_KEY", "SECOND_KEY"]).with_reader(read_fake_env);
        assert!(source.lookup().is_none());

        set_fake("SECOND_KEY", Some("from-second"));
        assert_eq!(source.lookup().unwrap().expose(), "from-second");

        // Blank values are skipped; a later non-blank value takes over.
        set_fake("FIRST_KEY", Some("  "));
        assert_eq!(source.lookup().unwrap().expose(), "from-second");

        // Rotation is visible on the next lookup.
        set_fake("FIRST_KEY", Some("rotated"));
        assert_eq!(source.lookup().unwrap().expose(), "rotated");

        set_fake("FIRST_KEY", None);
        set_fake("SECOND_KEY", None);
        assert!(source.lookup().is_none());
    }

    #[test]
    fn default_source_reads_process_environment() {
        let source = EnvCredentials::new(["LUDICA_TEST_NEVER_SET_5d1e"]);
        assert!(source.lookup().is_none());
    }

    #[test]
    fn describe_lists_variables() {
        assert_eq!(
            EnvCredentials::default().describe(),
            "LUDICA_API_KEY, GEMINI_API_KEY, API_KEY"
        );
        assert_eq!(EnvCredentials::new(["ONLY"]).describe(), "ONLY");
        assert_eq!(EnvCredentials::new(Vec::<String>::new()).describe(), "-");
    }
}
