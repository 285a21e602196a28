use crate::context::AppContext;
use anyhow::Result;
use panel_application::relocate_excerpts;
use panel_core::review::offset_to_position;

pub async fn run(ctx: &AppContext, document: &str) -> Result<()> {
    let usecase = ctx.review_usecase()?;

    let Some(mut result) = usecase.load_review(document).await? else {
        println!("No review found at {}", usecase.artifact_path(document));
        return Ok(());
    };

    let text = match usecase.read_document(document).await {
        Ok(text) => {
            relocate_excerpts(&mut result, &text);
            Some(text)
        }
        Err(e) => {
            tracing::warn!(document, error = %e, "Document unreadable; excerpts stay unlocated");
            None
        }
    };

    println!("## Meta-Review Summary");
    println!("{}", result.synthesis);

    for name in result.persona_names() {
        println!();
        println!("## {name}");
        for comment in result.comments_by(name) {
            println!("- {}", comment.text);
            match (&text, comment.start, &comment.excerpt) {
                (Some(text), Some(start), Some(excerpt)) => {
                    let (line, column) = offset_to_position(text, start);
                    println!("    {line}:{column} \"{excerpt}\"");
                }
                (_, None, Some(excerpt)) => println!("    (not found) \"{excerpt}\""),
                _ => {}
            }
        }
    }

    Ok(())
}
