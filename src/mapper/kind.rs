//! The resource kinds a mapper can serve and the input formats each accepts.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The kinds of resource a short ID can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// An application.
    App,
    /// A deployment of a service.
    Deployment,
    /// A running instance.
    Instance,
    /// A secret.
    Secret,
    /// A custom domain.
    Domain,
    /// A persistent volume.
    Volume,
    /// A volume snapshot.
    Snapshot,
    /// An organization.
    Organization,
    /// The per-region part of a deployment.
    RegionalDeployment,
    /// A managed database.
    Database,
    /// A service within an app.
    Service,
}

impl ResourceKind {
    /// Number of kinds.
    pub const COUNT: usize = 11;

    /// Every kind, in declaration order.
    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::App,
        ResourceKind::Deployment,
        ResourceKind::Instance,
        ResourceKind::Secret,
        ResourceKind::Domain,
        ResourceKind::Volume,
        ResourceKind::Snapshot,
        ResourceKind::Organization,
        ResourceKind::RegionalDeployment,
        ResourceKind::Database,
        ResourceKind::Service,
    ];

    /// Lowercase, hyphenated name.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::App => "app",
            ResourceKind::Deployment => "deployment",
            ResourceKind::Instance => "instance",
            ResourceKind::Secret => "secret",
            ResourceKind::Domain => "domain",
            ResourceKind::Volume => "volume",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::Organization => "organization",
            ResourceKind::RegionalDeployment => "regional-deployment",
            ResourceKind::Database => "database",
            ResourceKind::Service => "service",
        }
    }

    /// Whether resources of this kind can be referred to by name.
    pub fn has_name(self) -> bool {
        !matches!(
            self,
            ResourceKind::Deployment | ResourceKind::Instance | ResourceKind::RegionalDeployment
        )
    }

    /// Input formats `resolve_id` accepts for this kind.
    pub fn accepted_formats(self, short_id_len: usize) -> Vec<AcceptedFormat> {
        let mut formats = vec![
            AcceptedFormat::FullId,
            AcceptedFormat::ShortId { len: short_id_len },
        ];
        if self.has_name() {
            formats.push(AcceptedFormat::Name);
        }
        formats
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// One way of spelling a resource reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedFormat {
    /// The full canonical UUID.
    FullId,
    /// A prefix of the ID with separators removed.
    ShortId {
        /// Number of characters the prefix must have.
        len: usize,
    },
    /// The resource's name.
    Name,
}

impl fmt::Display for AcceptedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptedFormat::FullId => f.write_str("a full UUID"),
            AcceptedFormat::ShortId { len } => write!(f, "a short ID of {} characters", len),
            AcceptedFormat::Name => f.write_str("a name"),
        }
    }
}

/// "a, b or c"
pub(crate) fn describe_formats(formats: &[AcceptedFormat]) -> String {
    let parts: Vec<String> = formats.iter().map(ToString::to_string).collect();
    match parts.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}
