use crate::context::AppContext;
use anyhow::{Context, Result};

pub async fn run(ctx: &AppContext, document: &str) -> Result<()> {
    let usecase = ctx.review_usecase()?;

    let report = usecase
        .review_document(document)
        .await
        .with_context(|| format!("Review of {document} failed"))?;

    println!(
        "{} comments from {} personas",
        report.result.comments.len(),
        report.result.persona_names().len()
    );
    if !report.failures.is_empty() {
        let failed: Vec<_> = report
            .failures
            .iter()
            .map(|f| f.persona_name.as_str())
            .collect();
        println!("No feedback from: {}", failed.join(", "));
    }
    println!("Saved: {}", ctx.vault().join(&report.artifact_path).display());

    Ok(())
}
