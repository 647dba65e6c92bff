//! `daylog category ...`.

use tracing::info;

use super::{Context, to_json};
use crate::error::ClientResult;

pub async fn list(ctx: &Context) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    if ctx.is_json() {
        return to_json(&snapshot.categories);
    }
    if snapshot.categories.is_empty() {
        return Ok("No categories".to_string());
    }
    Ok(snapshot
        .categories
        .iter()
        .map(|c| {
            format!(
                "#{} {} {}{}",
                c.id,
                c.name,
                c.color.as_deref().unwrap_or("-"),
                if c.visible { "" } else { " (hidden)" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Shows or hides a category's items in the calendar.
pub async fn set_visible(ctx: &Context, id: i64, visible: bool) -> ClientResult<String> {
    // Visibility needs the current category list to check the id.
    let snapshot = ctx.load().await?;
    let record = ctx
        .store
        .set_category_visibility(ctx.backend.as_ref(), id, visible)
        .await?;
    info!(id, visible, "Category visibility changed");
    if ctx.is_json() {
        return to_json(&record);
    }
    let name = snapshot
        .category(id)
        .map(|c| c.name.as_str())
        .unwrap_or_default();
    let verb = if record.visible { "Showing" } else { "Hiding" };
    Ok(format!("{} #{} {}", verb, id, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{day, testing};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn list_marks_hidden() {
        let (_dir, ctx) = testing::context();
        let output = list(&ctx).await.unwrap();
        insta::assert_snapshot!(output, @r"
        #1 Work #3174ad
        #2 Health #33b679 (hidden)
        ");
    }

    #[tokio::test]
    async fn show_brings_items_back() {
        let (_dir, ctx) = testing::context();
        let output = set_visible(&ctx, 2, true).await.unwrap();
        assert_eq!(output, "Showing #2 Health");

        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let output = day::day(&ctx, date).await.unwrap();
        assert!(output.contains("Physio"));
    }

    #[tokio::test]
    async fn hide_removes_items() {
        let (_dir, ctx) = testing::context();
        set_visible(&ctx, 1, false).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let output = day::day(&ctx, date).await.unwrap();
        assert!(!output.contains("Standup"));
        assert!(ctx.store.current().category(1).is_some_and(|c| !c.visible));
    }

    #[tokio::test]
    async fn unknown_category() {
        let (_dir, ctx) = testing::context();
        let err = set_visible(&ctx, 42, false).await.unwrap_err();
        assert_eq!(err.to_string(), "category 42 not found");
    }
}
