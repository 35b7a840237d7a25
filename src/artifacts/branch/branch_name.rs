use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use anyhow::Context;
use derive_new::new;

pub const REF_PREFIX: &str = "refs/heads/";

/// Full name of a reference, relative to the git directory
/// (e.g. `refs/heads/master` or `HEAD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, new)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn is_detached_head(&self) -> bool {
        self.0 == "HEAD"
    }

    pub fn as_ref_path(&self) -> &str {
        &self.0
    }

    /// Name shown to the user: the branch name for `refs/heads/*`, `HEAD` when detached.
    pub fn short_name(&self) -> &str {
        if self.is_detached_head() {
            return "detached HEAD";
        }

        self.0.strip_prefix(REF_PREFIX).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for SymRefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            anyhow::bail!("branch name cannot be empty");
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            anyhow::bail!("invalid branch name: {}", name);
        } else {
            Ok(Self(name))
        }
    }

    pub fn to_sym_ref_name(&self) -> SymRefName {
        SymRefName::new(format!("{REF_PREFIX}{}", self.0))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
