//! `daylog day` and `daylog show`.

use chrono::NaiveDate;
use daylog_core::DisplayEvent;

use super::{Context, to_json};
use crate::error::{ClientError, ClientResult};

/// Renders the items on `date`, followed by the day's diary entries.
pub async fn day(ctx: &Context, date: NaiveDate) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    let items = snapshot.day(date);
    let diaries = snapshot.diaries_on(date);
    if ctx.is_json() {
        let agenda = ctx
            .formatter
            .format_json(date, &items)
            .with_diaries(ctx.formatter.format_diaries_json(&diaries));
        return to_json(&agenda);
    }
    let mut out = ctx.formatter.format_text(date, &items);
    for line in ctx.formatter.format_diary_lines(&diaries) {
        out.push_str("\n  Diary: ");
        out.push_str(&line);
    }
    Ok(out)
}

/// Renders the display form of one event.
pub async fn show(ctx: &Context, id: i64) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    let event = snapshot
        .display_event(id)
        .ok_or(ClientError::not_found("event", id))?;
    if ctx.is_json() {
        return to_json(&event);
    }
    let category = event
        .category_id
        .and_then(|cid| snapshot.category(cid))
        .map(|c| c.name.as_str());
    Ok(render_event(&event, category))
}

pub(crate) fn render_event(event: &DisplayEvent, category: Option<&str>) -> String {
    let mut lines = vec![format!("#{} {}", event.id, event.title)];
    if event.all_day {
        let stored = event.to_stored_times();
        let (first, last) = (stored.start_time.date(), stored.end_time.date());
        if first == last {
            lines.push(format!("  when:     {} (all day)", first));
        } else {
            lines.push(format!("  when:     {} to {} (all day)", first, last));
        }
    } else {
        lines.push(format!(
            "  when:     {} to {} ({} min)",
            event.display_start.format("%Y-%m-%d %H:%M"),
            event.display_end.format("%Y-%m-%d %H:%M"),
            event.duration_minutes()
        ));
    }
    lines.push(format!("  color:    {}", event.display_color));
    if let Some(name) = category {
        lines.push(format!("  category: {}", name));
    }
    if let Some(ref description) = event.description {
        lines.push(format!("  notes:    {}", description));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use daylog_core::OutputFormat;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn day_text_hides_hidden_categories() {
        let (_dir, ctx) = testing::context();
        let output = day(&ctx, date(11)).await.unwrap();
        insta::assert_snapshot!(output, @r"
        Monday, March 11 2024
          All day (Mar 10 - Mar 12)  Conference
          09:00-09:15  Standup
          [x] Ship it (due 12:00)
          [ ] Write report (40%, due 17:00)
          Diary: 20:30  Retro notes (2 linked)
        ");
    }

    #[tokio::test]
    async fn day_json() {
        let (_dir, ctx) = testing::context_with(OutputFormat::Json);
        let output = day(&ctx, date(12)).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["date"], "2024-03-12");
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["items"][0]["title"], "Conference");
        assert_eq!(parsed["diaries"][0]["title"], "Conference day two");
        assert_eq!(parsed["diaries"][0]["time_display"], "21:00");
    }

    #[tokio::test]
    async fn empty_day() {
        let (_dir, ctx) = testing::context();
        let output = day(&ctx, date(20)).await.unwrap();
        assert!(output.ends_with("Nothing planned"));

        let json = testing::context_with(OutputFormat::Json);
        let output = day(&json.1, date(20)).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed.get("diaries").is_none());
    }

    #[tokio::test]
    async fn show_all_day_event() {
        let (_dir, ctx) = testing::context();
        let output = show(&ctx, 1).await.unwrap();
        insta::assert_snapshot!(output, @r"
        #1 Conference
          when:     2024-03-10 to 2024-03-12 (all day)
          color:    #ffffff
        ");
    }

    #[tokio::test]
    async fn show_timed_event_json() {
        let (_dir, ctx) = testing::context_with(OutputFormat::Json);
        let output = show(&ctx, 2).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["display_start"], "2024-03-11T09:00:00");
        assert_eq!(parsed["display_color"], "#3174ad");
    }

    #[tokio::test]
    async fn show_unknown_event() {
        let (_dir, ctx) = testing::context();
        let err = show(&ctx, 99).await.unwrap_err();
        assert_eq!(err.to_string(), "event 99 not found");
    }
}
