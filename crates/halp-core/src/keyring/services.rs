//! Service descriptors

/// Describes one class of stored secret
///
/// `name` doubles as the backend service id; `label` and `description` are
/// display metadata stored alongside the secret where the backend allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    /// Reverse-domain service id
    pub name: &'static str,
    /// Short label
    pub label: &'static str,
    /// Longer description
    pub description: &'static str,
}

impl ServiceDescriptor {
    /// Tempo API token
    pub const TEMPO: Self = Self {
        name: "com.keyring.go.tempo",
        label: "Tempo Token",
        description: "Tempo API Token",
    };

    /// Jira API token
    pub const JIRA: Self = Self {
        name: "com.keyring.go.jira",
        label: "Jira Token",
        description: "Jira API Token",
    };

    /// Wildcard used for bulk deletion
    pub const ALL: Self = Self {
        name: "com.keyring.go.*",
        label: "",
        description: "",
    };

    /// Every concrete service, in the order handles are opened
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::TEMPO, Self::JIRA]
    }

    /// Whether this is the wildcard descriptor
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.name == Self::ALL.name
    }
}
