//! Page computation for sources that hold their whole key space locally.
//!
//! Mirrors delimited object listing: keys are filtered by prefix and
//! `start_after`, rolled up into common prefixes at the first delimiter
//! after the prefix, and cut into pages of at most `page_size` results
//! (entries and common prefixes both count). The continuation token records
//! the last key or common prefix handed out; a common prefix token also
//! skips every key below it.

use stratus_types::PageToken;

use crate::request::{ListRequest, ObjectEntry, ObjectPage};

const KEY_TOKEN: &str = "k:";
const PREFIX_TOKEN: &str = "p:";

enum Resume<'a> {
    AfterKey(&'a str),
    AfterPrefix(&'a str),
}

impl<'a> Resume<'a> {
    fn parse(token: &'a PageToken) -> Self {
        let raw = token.as_str();
        if let Some(prefix) = raw.strip_prefix(PREFIX_TOKEN) {
            Self::AfterPrefix(prefix)
        } else {
            Self::AfterKey(raw.strip_prefix(KEY_TOKEN).unwrap_or(raw))
        }
    }

    fn skips(&self, key: &str) -> bool {
        match self {
            Self::AfterKey(last) => key <= *last,
            Self::AfterPrefix(prefix) => key <= *prefix || key.starts_with(prefix),
        }
    }
}

/// Compute one page of `request` over `objects`, which must be sorted by key.
pub fn paginate<'a, I>(objects: I, request: &ListRequest, page_size: usize) -> ObjectPage
where
    I: IntoIterator<Item = &'a ObjectEntry>,
{
    let page_size = page_size.max(1);
    let resume = request.continuation_token.as_ref().map(Resume::parse);
    let mut page = ObjectPage::default();
    let mut count = 0usize;
    let mut last: Option<String> = None;

    for obj in objects {
        let key = obj.key.as_str();
        if !key.starts_with(request.prefix.as_str()) {
            continue;
        }
        if !request.start_after.is_empty() && key <= request.start_after.as_str() {
            continue;
        }
        if resume.as_ref().is_some_and(|r| r.skips(key)) {
            continue;
        }

        let rest = &key[request.prefix.len()..];
        let common = if request.delimiter.is_empty() {
            None
        } else {
            rest.find(request.delimiter.as_str())
                .map(|idx| &key[..request.prefix.len() + idx + request.delimiter.len()])
        };
        if let Some(common) = common {
            if page.common_prefixes.last().map(String::as_str) == Some(common) {
                continue;
            }
        }

        if count == page_size {
            page.next_token = last.map(PageToken::new);
            break;
        }
        count += 1;
        match common {
            Some(common) => {
                page.common_prefixes.push(common.to_string());
                last = Some(format!("{PREFIX_TOKEN}{common}"));
            }
            None => {
                page.entries.push(obj.clone());
                last = Some(format!("{KEY_TOKEN}{key}"));
            }
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_types::{epoch, ResourcePath};

    fn objects(keys: &[&str]) -> Vec<ObjectEntry> {
        let mut v: Vec<ObjectEntry> = keys.iter().map(|k| ObjectEntry::new(*k, 1, epoch())).collect();
        v.sort_by(|a, b| a.key.cmp(&b.key));
        v
    }

    fn keys(page: &ObjectPage) -> Vec<&str> {
        page.entries.iter().map(|e| e.key.as_str()).collect()
    }

    fn bucket_request() -> ListRequest {
        ListRequest::for_container(&ResourcePath::bucket("b"))
    }

    #[test]
    fn rolls_up_common_prefixes() {
        let objs = objects(&["a.txt", "dir/x", "dir/y", "dir/sub/z", "other/q"]);
        let page = paginate(&objs, &bucket_request(), 100);
        assert_eq!(keys(&page), vec!["a.txt"]);
        assert_eq!(page.common_prefixes, vec!["dir/", "other/"]);
        assert!(page.next_token.is_none());
    }

    #[test]
    fn lists_below_prefix_and_skips_marker() {
        let objs = objects(&["dir/", "dir/x", "dir/sub/z", "dirt"]);
        let req = ListRequest::for_container(&ResourcePath::object("b", "dir/"));
        let page = paginate(&objs, &req, 100);
        assert_eq!(keys(&page), vec!["dir/x"]);
        assert_eq!(page.common_prefixes, vec!["dir/sub/"]);
    }

    #[test]
    fn pages_until_exhausted() {
        let objs = objects(&["a", "b", "c", "d", "e"]);
        let mut req = bucket_request();
        let mut seen = Vec::new();
        let mut pages = 0;
        loop {
            let page = paginate(&objs, &req, 2);
            pages += 1;
            seen.extend(page.entries.iter().map(|e| e.key.clone()));
            match page.next_token {
                Some(t) => req = req.with_token(Some(t)),
                None => break,
            }
        }
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(pages, 3);
    }

    #[test]
    fn prefix_token_skips_rolled_up_keys() {
        let objs = objects(&["a/1", "a/2", "a/3", "b"]);
        let page = paginate(&objs, &bucket_request(), 1);
        assert_eq!(page.common_prefixes, vec!["a/"]);
        let token = page.next_token.clone().unwrap();
        let next = paginate(&objs, &bucket_request().with_token(Some(token)), 1);
        assert_eq!(keys(&next), vec!["b"]);
        assert!(next.common_prefixes.is_empty());
        assert!(next.next_token.is_none());
    }

    #[test]
    fn exact_page_has_no_token() {
        let objs = objects(&["a", "b"]);
        let page = paginate(&objs, &bucket_request(), 2);
        assert_eq!(keys(&page), vec!["a", "b"]);
        assert!(page.next_token.is_none());
    }

    #[test]
    fn no_delimiter_lists_recursively() {
        let objs = objects(&["a/1", "a/b/2"]);
        let mut req = bucket_request();
        req.delimiter.clear();
        let page = paginate(&objs, &req, 10);
        assert_eq!(keys(&page), vec!["a/1", "a/b/2"]);
        assert!(page.common_prefixes.is_empty());
    }

    #[test]
    fn empty_key_space() {
        let none: Vec<ObjectEntry> = Vec::new();
        let page = paginate(&none, &bucket_request(), 10);
        assert_eq!(page, ObjectPage::default());
    }
}
