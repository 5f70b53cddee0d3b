use crate::core::policy::Policy;
use anyhow::{Context, Result};

/// Creates a default policy file with example content at the default location
pub fn setup() -> Result<()> {
    let path = Policy::default_policy_path()?;

    if path.exists() {
        anyhow::bail!("Policy file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Include the example policy as a string literal in the binary
    let default_policy = include_str!("../../docs/example_policy.yaml");

    std::fs::write(&path, default_policy)
        .with_context(|| format!("Failed to write policy file to {}", path.display()))?;

    tracing::info!("Created default policy at {}", path.display());
    Ok(())
}
