use crate::rules::LINEAR_SEARCH_CALL;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// `CrLf` only when every line break is `\r\n`; mixed files are matched
    /// as-is so untouched lines keep their bytes.
    pub fn detect(input: &str) -> Self {
        let breaks = input.matches('\n').count();
        if breaks > 0 && input.matches("\r\n").count() == breaks {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    /// Text with every `\r\n` folded to `\n`, so the `\n`-based rules match.
    pub fn normalize<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self {
            LineEnding::Lf => Cow::Borrowed(input),
            LineEnding::CrLf => Cow::Owned(input.replace("\r\n", "\n")),
        }
    }

    pub fn restore(&self, input: String) -> String {
        match self {
            LineEnding::Lf => input,
            LineEnding::CrLf => input.replace('\n', "\r\n"),
        }
    }
}

/// Literal occurrences of the bare `find` call, ignoring the `ok_or_else`
/// tail the lookup rule also requires.
pub fn count_linear_searches(input: &str) -> usize {
    input.matches(LINEAR_SEARCH_CALL).count()
}
