use crate::context::AppContext;
use anyhow::{Context, Result};
use panel_infrastructure::PanelPaths;

pub fn run(ctx: &AppContext) -> Result<()> {
    let repository = ctx.config_repository()?;
    if repository.ensure_template()? {
        println!("Created {}", repository.path().display());
    } else {
        println!("Kept existing {}", repository.path().display());
    }

    let secret_path = ctx.secret_path()?;
    let created = PanelPaths::ensure_secret_file(&secret_path)
        .with_context(|| format!("Failed to create {}", secret_path.display()))?;
    if created {
        println!("Created {} (add your API keys)", secret_path.display());
    } else {
        println!("Kept existing {}", secret_path.display());
    }

    Ok(())
}
