//! Pagination and sorting primitives shared by the service and the
//! repositories.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::models::Note;

/// Fields a note listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    Title,
    Content,
    Pinned,
    Archived,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Column name in the `note` table.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Content => "content",
            SortField::Pinned => "pinned",
            SortField::Archived => "archived",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Name as exposed to API clients.
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Content => "content",
            SortField::Pinned => "pinned",
            SortField::Archived => "archived",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    /// SQL expression ordered on. Text columns compare lower-cased under the
    /// `C` collation, so the order does not depend on the server's locale.
    pub fn order_expr(self, alias: &str) -> String {
        match self {
            SortField::Title | SortField::Content => {
                format!("lower({alias}.{}) COLLATE \"C\"", self.column())
            }
            _ => format!("{alias}.{}", self.column()),
        }
    }

    /// Ascending comparison of two notes on this field, matching
    /// [`order_expr`](Self::order_expr).
    ///
    /// A missing `content` sorts before any present value.
    pub fn compare(self, a: &Note, b: &Note) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Content => a
                .content
                .as_deref()
                .map(str::to_lowercase)
                .cmp(&b.content.as_deref().map(str::to_lowercase)),
            SortField::Pinned => a.pinned.cmp(&b.pinned),
            SortField::Archived => a.archived.cmp(&b.archived),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "content" => Ok(SortField::Content),
            "pinned" => Ok(SortField::Pinned),
            "archived" => Ok(SortField::Archived),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(Error::invalid(format!(
                "Unsupported sort field: '{}'",
                other
            ))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `"asc"` in any case means ascending; anything else is descending.
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Apply this direction to an ascending ordering.
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Field plus direction. Defaults to most recently updated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::UpdatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parse a `field[,direction]` string such as `"title,asc"`.
    ///
    /// An empty field falls back to the default sort field.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.splitn(2, ',');
        let field = match parts.next().map(str::trim) {
            Some("") | None => SortField::UpdatedAt,
            Some(f) => f.parse()?,
        };
        let direction = parts
            .next()
            .map(SortDirection::parse_lenient)
            .unwrap_or_default();
        Ok(Self { field, direction })
    }

    /// Full comparison including the `id` tiebreaker, in this direction.
    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        let primary = self.field.compare(a, b);
        let ord = if primary == Ordering::Equal {
            a.id.cmp(&b.id)
        } else {
            primary
        };
        self.direction.apply(ord)
    }

    /// SQL `ORDER BY` body. Field and direction come from closed enums, so
    /// the output is safe to splice into a statement.
    pub fn order_clause(&self, alias: &str) -> String {
        let dir = self.direction.sql();
        let nulls = match self.direction {
            SortDirection::Asc => "NULLS FIRST",
            SortDirection::Desc => "NULLS LAST",
        };
        if self.field == SortField::Id {
            format!("{alias}.id {dir}")
        } else {
            format!(
                "{expr} {dir} {nulls}, {alias}.id {dir}",
                expr = self.field.order_expr(alias)
            )
        }
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: defaults::PAGE_INDEX,
            size: defaults::PAGE_SIZE,
            sort: Sort::default(),
        }
    }
}

impl PageRequest {
    /// Build a request sorted by the default order.
    ///
    /// `size` must be at least 1.
    pub fn new(page: u32, size: u32) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid("Page size must not be less than one"));
        }
        Ok(Self {
            page,
            size,
            sort: Sort::default(),
        })
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Row offset for this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// One page of results plus the metadata clients need to paginate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[aliases(NotePage = Page<crate::models::NoteResponse>)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let size = i64::from(request.size.max(1));
        let total_pages = (total_elements.max(0) + size - 1) / size;
        let page = request.page;
        Self {
            empty: content.is_empty(),
            content,
            page,
            size: request.size,
            total_elements,
            total_pages,
            first: page == 0,
            last: i64::from(page) + 1 >= total_pages,
        }
    }

    /// Map every element, keeping the pagination metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn note(title: &str, content: Option<&str>, age_secs: i64) -> Note {
        let ts = Utc::now() - Duration::seconds(age_secs);
        Note {
            id: Uuid::now_v7(),
            title: title.to_string(),
            content: content.map(String::from),
            tags: BTreeSet::new(),
            pinned: false,
            archived: false,
            deleted: false,
            user_id: Uuid::nil(),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_sort_field_accepts_both_spellings() {
        assert_eq!("updatedAt".parse::<SortField>().unwrap(), SortField::UpdatedAt);
        assert_eq!("created_at".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert!("deleted".parse::<SortField>().is_err());
        assert!("userId".parse::<SortField>().is_err());
    }

    #[test]
    fn test_direction_is_lenient() {
        assert_eq!(SortDirection::parse_lenient("ASC"), SortDirection::Asc);
        assert_eq!(SortDirection::parse_lenient("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse_lenient("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::parse_lenient("sideways"), SortDirection::Desc);
    }

    #[test]
    fn test_sort_parse_spec() {
        assert_eq!(Sort::parse("updatedAt,desc").unwrap(), Sort::default());
        assert_eq!(
            Sort::parse("title,asc").unwrap(),
            Sort::new(SortField::Title, SortDirection::Asc)
        );
        assert_eq!(
            Sort::parse("title").unwrap(),
            Sort::new(SortField::Title, SortDirection::Desc)
        );
        assert_eq!(Sort::parse("").unwrap(), Sort::default());
        assert!(Sort::parse("owner,asc").is_err());
    }

    #[test]
    fn test_order_clause_has_id_tiebreaker() {
        let clause = Sort::default().order_clause("n");
        assert_eq!(clause, "n.updated_at DESC NULLS LAST, n.id DESC");

        let by_id = Sort::new(SortField::Id, SortDirection::Asc).order_clause("n");
        assert_eq!(by_id, "n.id ASC");

        let by_title = Sort::new(SortField::Title, SortDirection::Asc).order_clause("n");
        assert_eq!(
            by_title,
            "lower(n.title) COLLATE \"C\" ASC NULLS FIRST, n.id ASC"
        );
    }

    #[test]
    fn test_title_order_ignores_case() {
        let banana = note("Banana", None, 0);
        let apple = note("apple", None, 0);
        let cherry = note("cherry", None, 0);
        let mut notes = vec![banana.clone(), cherry.clone(), apple.clone()];
        let sort = Sort::new(SortField::Title, SortDirection::Asc);
        notes.sort_by(|a, b| sort.compare(a, b));
        let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["apple", "Banana", "cherry"]);
    }

    #[test]
    fn test_sort_compare_default_is_newest_first() {
        let old = note("old", None, 60);
        let new = note("new", None, 0);
        let mut notes = vec![old.clone(), new.clone()];
        let sort = Sort::default();
        notes.sort_by(|a, b| sort.compare(a, b));
        assert_eq!(notes[0].id, new.id);
        assert_eq!(notes[1].id, old.id);
    }

    #[test]
    fn test_missing_content_sorts_first_ascending() {
        let with = note("a", Some("text"), 0);
        let without = note("b", None, 0);
        let sort = Sort::new(SortField::Content, SortDirection::Asc);
        assert_eq!(sort.compare(&without, &with), Ordering::Less);
    }

    #[test]
    fn test_page_request_rejects_zero_size() {
        assert!(PageRequest::new(0, 0).is_err());
        let req = PageRequest::new(3, 20).unwrap();
        assert_eq!(req.offset(), 60);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_page_metadata() {
        let req = PageRequest::new(1, 10).unwrap();
        let page = Page::new(vec![1, 2, 3], &req, 13);
        assert_eq!(page.total_pages, 2);
        assert!(!page.first);
        assert!(page.last);
        assert!(!page.empty);

        let first = Page::new(Vec::<i32>::new(), &PageRequest::default(), 0);
        assert_eq!(first.total_pages, 0);
        assert!(first.first);
        assert!(first.last);
        assert!(first.empty);
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let req = PageRequest::new(0, 2).unwrap();
        let page = Page::new(vec![1, 2], &req, 5).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
        assert!(!page.last);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec!["x"], &PageRequest::default(), 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["content"], serde_json::json!(["x"]));
    }
}
