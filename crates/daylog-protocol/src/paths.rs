//! Endpoint paths, relative to the backend base URL.

pub const EVENTS: &str = "/api/events";
pub const TODOS: &str = "/api/todos";
pub const CATEGORIES: &str = "/api/categories";
pub const CATEGORY_VISIBILITY: &str = "/api/categories/visibility";
pub const DIARIES: &str = "/api/diaries";

pub fn event(id: i64) -> String {
    format!("{EVENTS}/{id}")
}

pub fn todo(id: i64) -> String {
    format!("{TODOS}/{id}")
}

pub fn todo_progress(id: i64) -> String {
    format!("{TODOS}/{id}/progress")
}

pub fn diary(id: i64) -> String {
    format!("{DIARIES}/{id}")
}

pub fn category_visibility(category_id: i64) -> String {
    format!("{CATEGORIES}/{category_id}/visibility")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_paths() {
        assert_eq!(event(3), "/api/events/3");
        assert_eq!(todo(8), "/api/todos/8");
        assert_eq!(todo_progress(8), "/api/todos/8/progress");
        assert_eq!(category_visibility(2), "/api/categories/2/visibility");
        assert_eq!(diary(5), "/api/diaries/5");
    }
}
