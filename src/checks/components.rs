use async_trait::async_trait;

use super::matcher::{OutputMatcher, ProcessName};
use super::roles::{self, HIVE, NAMENODE, RESOURCEMANAGER, SLAVE};
use super::{ensure, Check, CheckFailure};
use crate::deployment::ClusterContext;

/// A daemon and the only role allowed to run it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub process: &'static str,
    pub role: &'static str,
}

pub const PLACEMENTS: [Placement; 6] = [
    Placement { process: "NameNode", role: NAMENODE },
    Placement { process: "ResourceManager", role: RESOURCEMANAGER },
    Placement { process: "JobHistoryServer", role: RESOURCEMANAGER },
    Placement { process: "NodeManager", role: SLAVE },
    Placement { process: "DataNode", role: SLAVE },
    Placement { process: "HiveServer2", role: HIVE },
];

/// Process listing captured from one role
#[derive(Debug, Clone)]
pub struct Listing {
    pub role: &'static str,
    pub output: String,
}

/// Confirms every daemon runs on its own role and nowhere else
pub struct ComponentsCheck {
    listing_command: String,
}

impl Default for ComponentsCheck {
    fn default() -> Self {
        Self {
            listing_command: "pgrep -a java".to_string(),
        }
    }
}

fn listing_for<'a>(listings: &'a [Listing], role: &str) -> &'a str {
    listings
        .iter()
        .find(|listing| listing.role == role)
        .map(|listing| listing.output.as_str())
        .unwrap_or_default()
}

/// Assert every placement against the listings; the first mismatch wins
pub fn verify_placements(
    placements: &[Placement],
    listings: &[Listing],
) -> Result<(), CheckFailure> {
    for placement in placements {
        let matcher = ProcessName::new(placement.process);

        let home = listing_for(listings, placement.role);
        ensure(matcher.matches(home), || {
            format!(
                "{matcher} not started\n{} process listing:\n{home}",
                placement.role
            )
        })?;

        for other in listings.iter().filter(|l| l.role != placement.role) {
            ensure(!matcher.matches(&other.output), || {
                format!(
                    "{matcher} should not be running on {}\n{} process listing:\n{}",
                    other.role, other.role, other.output
                )
            })?;
        }
    }
    Ok(())
}

#[async_trait]
impl Check for ComponentsCheck {
    fn name(&self) -> &'static str {
        "components"
    }

    fn description(&self) -> &'static str {
        "Hadoop and Hive daemons run on their own role and nowhere else"
    }

    async fn run(&self, ctx: &ClusterContext) -> Result<(), CheckFailure> {
        let mut listings = Vec::with_capacity(roles::ALL.len());

        for role in roles::ALL {
            // pgrep exits 1 when nothing matches; the listing is what counts
            let result = ctx.sentry(role)?.run(&self.listing_command).await?;
            tracing::debug!("{role} java processes:\n{}", result.output);
            listings.push(Listing {
                role,
                output: result.output,
            });
        }

        verify_placements(&PLACEMENTS, &listings)
    }
}
