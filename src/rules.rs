use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// The bare linear scan, as counted for the status line.
pub const LINEAR_SEARCH_CALL: &str = "items.iter_mut().find(|app| app.id.unwrap_or(0) == id)";

const LINEAR_SEARCH_STATEMENT: &str = concat!(
    "let appearance = items.iter_mut().find(|app| app.id.unwrap_or(0) == id)",
    r#".ok_or_else(|| format!("Appearance with ID {} not found in {:?}", id, category))?;"#,
);

const INDEXED_LOOKUP: &str = r#"// O(1) lookup via index
    let index_map = get_index_for_category(&state, &category);
    let appearance = if let Some(idx_ref) = index_map.get(&id) {
        let idx = *idx_ref;
        items.get_mut(idx).ok_or_else(|| format!("Index {} out of bounds", idx))?
    } else {
        items.iter_mut().find(|app| app.id.unwrap_or(0) == id)
            .ok_or_else(|| format!("Appearance {} not found", id))?
    };"#;

const ITEM_RESPONSE_RETURN: &str = "    Ok(create_appearance_item_response(id, appearance))\n}";

pub const INVALIDATION_MARKER: &str = "invalidate_search_cache";

const INVALIDATION_BLOCK: &str =
    "    // Invalidate cache (data changed)\n    invalidate_search_cache(&state);\n\n";

/// Lines spanned by [`INVALIDATION_BLOCK`]; the guard never looks back less.
pub const MIN_LOOKBACK: usize = 3;

static LINEAR_SEARCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&regex::escape(LINEAR_SEARCH_STATEMENT)).expect("regex compiles"));
static ITEM_RESPONSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&regex::escape(ITEM_RESPONSE_RETURN)).expect("regex compiles"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub applied: usize,
    pub skipped: usize,
}

pub fn replace_linear_search(input: &str) -> Rewrite {
    let applied = LINEAR_SEARCH_RE.find_iter(input).count();
    let text = LINEAR_SEARCH_RE
        .replace_all(input, NoExpand(INDEXED_LOOKUP))
        .into_owned();
    Rewrite {
        text,
        applied,
        skipped: 0,
    }
}

pub fn insert_cache_invalidation(input: &str, lookback: usize) -> Rewrite {
    let lookback = lookback.max(MIN_LOOKBACK);
    let mut text = String::with_capacity(input.len());
    let mut applied = 0;
    let mut skipped = 0;
    let mut last = 0;

    for site in ITEM_RESPONSE_RE.find_iter(input) {
        text.push_str(&input[last..site.start()]);
        let window = preceding_lines(input, site.start(), lookback);
        if window.contains(INVALIDATION_MARKER) {
            tracing::debug!(offset = site.start(), "cache invalidation already present");
            skipped += 1;
        } else {
            text.push_str(INVALIDATION_BLOCK);
            applied += 1;
        }
        text.push_str(site.as_str());
        last = site.end();
    }
    text.push_str(&input[last..]);

    Rewrite {
        text,
        applied,
        skipped,
    }
}

/// Up to `lines` full lines ending right before byte `end`, stopping at the
/// enclosing function's signature or the previous function's closing brace.
fn preceding_lines(input: &str, end: usize, lines: usize) -> &str {
    let before = &input[..end];
    let mut start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let mut taken = 0;
    while taken < lines && start > 0 {
        let line_start = before[..start - 1]
            .rfind('\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        if is_fn_boundary(&before[line_start..start - 1]) {
            break;
        }
        start = line_start;
        taken += 1;
    }
    &before[start..]
}

fn is_fn_boundary(line: &str) -> bool {
    let trimmed = line.trim();
    let opens_fn =
        trimmed.ends_with('{') && (trimmed.starts_with("fn ") || trimmed.contains(" fn "));
    line == "}" || opens_fn
}
