//! Storage form to display form.
//!
//! The backend stores the last day of an all-day event inclusively
//! (`23:59:59.999`); the grid wants an exclusive end. Timed events are
//! already exclusive-safe and pass through.

use tracing::debug;

use crate::category::{Category, CategoryIndex};
use crate::event::{DisplayEvent, Event};
use crate::time;

/// Normalizes an event against the current category list.
pub fn normalize(event: &Event, categories: &[Category]) -> DisplayEvent {
    normalize_with(event, &CategoryIndex::new(categories))
}

/// Normalizes an event using a prebuilt category index.
pub fn normalize_with(event: &Event, index: &CategoryIndex<'_>) -> DisplayEvent {
    DisplayEvent {
        id: event.id,
        title: event.title.clone(),
        display_start: event.start_time,
        display_end: display_end(event),
        all_day: event.all_day,
        display_color: index.resolve_color(event.color.as_deref(), event.category.as_ref()),
        category_id: event.category.as_ref().map(|c| c.id),
        description: event.description.clone(),
    }
}

fn display_end(event: &Event) -> chrono::NaiveDateTime {
    if !event.all_day {
        return event.end_time;
    }
    if time::is_end_of_day_sentinel(event.end_time) {
        return time::start_of_day(time::next_day(event.end_time.date()));
    }
    debug!(
        event_id = event.id,
        end_time = %event.end_time,
        "all-day event end is not on the end-of-day sentinel; passing through"
    );
    event.end_time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{CategoryRef, DEFAULT_COLOR};
    use crate::event::EventTimes;
    use crate::time::DayRange;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, s).unwrap()
    }

    fn all_day(first: NaiveDate, last: NaiveDate) -> Event {
        Event::new(1, "Conference", EventTimes::all_day(DayRange::new(first, last)))
    }

    #[test]
    fn timed_event_unchanged() {
        let event = Event::new(
            2,
            "Dentist",
            EventTimes::timed(dt(2024, 3, 10, 14, 0, 0), dt(2024, 3, 10, 15, 0, 0)),
        );
        let view = normalize(&event, &[]);
        assert_eq!(view.display_start, event.start_time);
        assert_eq!(view.display_end, event.end_time);
        assert!(!view.all_day);
    }

    #[test]
    fn all_day_end_becomes_next_midnight() {
        let event = all_day(date(2024, 3, 10), date(2024, 3, 12));
        let view = normalize(&event, &[]);
        assert_eq!(view.display_start, dt(2024, 3, 10, 0, 0, 0));
        assert_eq!(view.display_end, dt(2024, 3, 13, 0, 0, 0));
    }

    #[test]
    fn sentinel_without_milliseconds_still_matches() {
        let mut event = all_day(date(2024, 12, 31), date(2024, 12, 31));
        event.end_time = dt(2024, 12, 31, 23, 59, 59);
        let view = normalize(&event, &[]);
        assert_eq!(view.display_end, dt(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn malformed_all_day_end_passes_through() {
        let mut event = all_day(date(2024, 3, 10), date(2024, 3, 10));
        event.end_time = dt(2024, 3, 10, 18, 30, 0);
        let view = normalize(&event, &[]);
        assert_eq!(view.display_end, dt(2024, 3, 10, 18, 30, 0));
    }

    #[test]
    fn round_trip_restores_inclusive_range() {
        for (first, last) in [
            (date(2024, 3, 10), date(2024, 3, 12)),
            (date(2024, 2, 28), date(2024, 3, 1)),
            (date(2024, 7, 4), date(2024, 7, 4)),
        ] {
            let event = all_day(first, last);
            let restored = normalize(&event, &[]).to_stored_times();
            assert_eq!(restored, event.times());
            assert_eq!(
                DayRange::new(restored.start_time.date(), restored.end_time.date()),
                DayRange::new(first, last)
            );
        }
    }

    #[test]
    fn color_resolution() {
        let categories = vec![Category::new(1, "Work").with_color("#3174ad")];

        let own = all_day(date(2024, 3, 10), date(2024, 3, 10))
            .with_color("#ff0000")
            .with_category(CategoryRef::new(1));
        assert_eq!(normalize(&own, &categories).display_color, "#ff0000");

        let by_category =
            all_day(date(2024, 3, 10), date(2024, 3, 10)).with_category(CategoryRef::new(1));
        let view = normalize(&by_category, &categories);
        assert_eq!(view.display_color, "#3174ad");
        assert_eq!(view.category_id, Some(1));

        let plain = all_day(date(2024, 3, 10), date(2024, 3, 10));
        assert_eq!(normalize(&plain, &categories).display_color, DEFAULT_COLOR);
    }
}
