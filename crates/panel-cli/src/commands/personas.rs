use crate::context::AppContext;
use anyhow::Result;
use panel_core::PanelError;

pub fn run(ctx: &AppContext, document: &str) -> Result<()> {
    let config = ctx.load_config()?;
    let set = match panel_core::persona::resolve(document, &config.folder_mappings, &config.personas) {
        Ok(set) => set,
        Err(PanelError::NoPersonas) => {
            println!("No personas defined. Run `panel init` or add [[persona]] entries.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if set.is_fallback() {
        println!("No folder mapping applies; using every persona.");
    }
    for persona in set.personas() {
        println!("{:<16} {}", persona.id, persona.name);
    }

    Ok(())
}
