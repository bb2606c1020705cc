use crate::detect::{LineEnding, count_linear_searches};
use crate::rules::{self, Rewrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    IndexedLookup,
    CacheInvalidation,
}

impl PatchKind {
    /// Rules in the order they run.
    pub const PIPELINE: [PatchKind; 2] = [PatchKind::IndexedLookup, PatchKind::CacheInvalidation];

    pub fn apply(&self, input: &str, options: &PatchOptions) -> Rewrite {
        match self {
            PatchKind::IndexedLookup => rules::replace_linear_search(input),
            PatchKind::CacheInvalidation => {
                rules::insert_cache_invalidation(input, options.lookback)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PatchOptions {
    pub lookback: usize,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            lookback: rules::MIN_LOOKBACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// Literal `find` calls seen before any rewrite.
    pub linear_searches: usize,
    pub lookups_replaced: usize,
    pub invalidations_added: usize,
    pub invalidations_present: usize,
    pub text: String,
}

impl PatchReport {
    pub fn changed(&self) -> bool {
        self.lookups_replaced > 0 || self.invalidations_added > 0
    }
}

pub fn patch_source(input: &str, options: &PatchOptions) -> PatchReport {
    let ending = LineEnding::detect(input);
    let normalized = ending.normalize(input);

    let mut report = PatchReport {
        linear_searches: count_linear_searches(&normalized),
        lookups_replaced: 0,
        invalidations_added: 0,
        invalidations_present: 0,
        text: String::new(),
    };

    let mut text = normalized.into_owned();
    for kind in PatchKind::PIPELINE {
        let rewrite = kind.apply(&text, options);
        tracing::debug!(?kind, applied = rewrite.applied, skipped = rewrite.skipped, "rule applied");
        match kind {
            PatchKind::IndexedLookup => report.lookups_replaced = rewrite.applied,
            PatchKind::CacheInvalidation => {
                report.invalidations_added = rewrite.applied;
                report.invalidations_present = rewrite.skipped;
            }
        }
        text = rewrite.text;
    }

    report.text = if report.changed() {
        ending.restore(text)
    } else {
        input.to_string()
    };
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"pub async fn set_name(category: AppearanceCategory, id: u32, name: String, state: tauri::State<'_, AppState>) -> Result<AppearanceItem, String> {
    let items = get_items_by_category_mut(appearances, &category);
    let appearance = items.iter_mut().find(|app| app.id.unwrap_or(0) == id).ok_or_else(|| format!("Appearance with ID {} not found in {:?}", id, category))?;
    appearance.name = Some(name);
    Ok(create_appearance_item_response(id, appearance))
}
"#;

    #[test]
    fn patches_sample_function() {
        let report = patch_source(SAMPLE, &PatchOptions::default());
        assert_eq!(report.linear_searches, 1);
        assert_eq!(report.lookups_replaced, 1);
        assert_eq!(report.invalidations_added, 1);
        assert_eq!(report.invalidations_present, 0);
        assert!(report.text.contains("let index_map = get_index_for_category(&state, &category);"));
        assert_eq!(report.text.matches("invalidate_search_cache(&state);").count(), 1);
        assert!(report.text.ends_with(
            "    appearance.name = Some(name);\n    // Invalidate cache (data changed)\n    invalidate_search_cache(&state);\n\n    Ok(create_appearance_item_response(id, appearance))\n}\n"
        ));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let first = patch_source(SAMPLE, &PatchOptions::default());
        let second = patch_source(&first.text, &PatchOptions::default());
        assert!(!second.changed());
        assert_eq!(second.text, first.text);
        assert_eq!(second.invalidations_present, 1);
        // The fallback branch keeps the bare call, so the count survives.
        assert_eq!(second.linear_searches, 1);
    }

    #[test]
    fn count_can_exceed_replacements() {
        let input = "let appearance = items.iter_mut().find(|app| app.id.unwrap_or(0) == id).ok_or_else(|| format!(\"Appearance {} not found\", id))?;\n";
        let report = patch_source(input, &PatchOptions::default());
        assert_eq!(report.linear_searches, 1);
        assert_eq!(report.lookups_replaced, 0);
        assert_eq!(report.text, input);
    }

    #[test]
    fn crlf_input_keeps_crlf() {
        let input = SAMPLE.replace('\n', "\r\n");
        let report = patch_source(&input, &PatchOptions::default());
        assert_eq!(report.lookups_replaced, 1);
        assert_eq!(report.invalidations_added, 1);
        assert!(!report.text.replace("\r\n", "").contains('\n'));
        assert!(report.text.contains("invalidate_search_cache(&state);\r\n\r\n"));
    }

    #[test]
    fn mixed_endings_keep_unpatched_lines() {
        let input = format!("// header\r\n{SAMPLE}");
        let report = patch_source(&input, &PatchOptions::default());
        assert_eq!(report.lookups_replaced, 1);
        assert_eq!(report.invalidations_added, 1);
        assert!(report.text.starts_with("// header\r\npub async fn set_name("));
        assert_eq!(report.text.matches("\r\n").count(), 1);
    }

    #[test]
    fn untouched_input_is_returned_verbatim() {
        let input = "fn main() {\r\n    println!(\"hi\");\n}\n";
        let report = patch_source(input, &PatchOptions::default());
        assert!(!report.changed());
        assert_eq!(report.text, input);
    }
}
