//! Classification of single build-log lines.
//!
//! Coded lines look like this once everything up to and including `MSB3277:` is cut away:
//!
//! ```text
//!  Found conflicts between different versions of "Foo" that could not be resolved.
//!      References which depend on "Foo, Version=3.0.0.0, ..." [C:\...\Foo.dll].
//!          C:\src\Bar\bin\Debug\Bar.dll
//!            Project file item includes which caused reference "C:\src\Bar\bin\Debug\Bar.dll".
//!              C:\src\Lib\bin\Debug\Lib.dll
//! ```
//!
//! each followed by the ` [C:\...\Project.csproj]` the warning was raised in. The column a line
//! starts at carries the nesting level.

use std::sync::LazyLock;

use regex::Regex;

use crate::identity::AssemblyIdentity;

/// Column of a direct reference under a `References which depend on` group.
pub(crate) const DIRECT_COLUMN: usize = 9;

/// Column of a transitive reference under a direct reference.
pub(crate) const TRANSITIVE_COLUMN: usize = 13;

static GROUP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"References which depend on "(.*?)""#).expect("group pattern is valid")
});

static MODULE_PATH_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\\/]([^\\/]+)\.(?i:exe|dll)").expect("module path pattern is valid")
});

static PROJECT_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\\/"\[\]]+)\.csproj"#).expect("project pattern is valid")
});

/// A line carrying the diagnostic code, split after the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CodedLine<'a> {
    /// Text after `<code>:`, leading spaces kept
    pub message: &'a str,
    /// Name of the project in the trailing `[...]`, if it names a `.csproj`
    pub project: Option<&'a str>,
}

/// What a coded line means to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive<'a> {
    /// `Found conflicts between different versions of ...`
    ReportStart,
    /// `References which depend on "<fusion name>"`
    GroupStart(&'a str),
    /// A reference at the direct-reference column
    DirectRef(&'a str),
    /// A reference at the transitive column
    TransitiveRef(&'a str),
    /// Matches a marker but not its full shape
    Malformed(&'static str),
    /// Anything else
    Continuation,
}

/// Split a line carrying `marker` (e.g. `MSB3277:`) into message and project context.
///
/// Returns `None` for lines without the marker.
pub(crate) fn split_coded<'a>(line: &'a str, marker: &str) -> Option<CodedLine<'a>> {
    let start = line.find(marker)? + marker.len();
    let text = &line[start..];
    let trimmed = text.trim_end();

    if let Some(inner) = trimmed.strip_suffix(']') {
        if let Some(open) = inner.rfind(" [") {
            return Some(CodedLine {
                message: &text[..open],
                project: project_name(&inner[open + 2..]),
            });
        }
    }

    Some(CodedLine {
        message: trimmed,
        project: None,
    })
}

/// Classify the message part of a coded line.
pub(crate) fn classify(message: &str) -> Directive<'_> {
    let body = message.trim_start_matches(' ');
    let column = message.len() - body.len();

    if body.starts_with("Found conflicts between different versions of") {
        Directive::ReportStart
    } else if body.starts_with("References which depend on") {
        match GROUP_RX.captures(body).and_then(|captures| captures.get(1)) {
            Some(fusion) => Directive::GroupStart(fusion.as_str()),
            None => Directive::Malformed("group without a quoted assembly name"),
        }
    } else if body.is_empty() {
        Directive::Continuation
    } else if column == DIRECT_COLUMN {
        Directive::DirectRef(body.trim_end())
    } else if column == TRANSITIVE_COLUMN {
        Directive::TransitiveRef(body.trim_end())
    } else {
        Directive::Continuation
    }
}

/// Name of the project a `Project "...\Name.csproj" ...` line announces.
pub(crate) fn announced_project(line: &str) -> Option<&str> {
    if line.starts_with("Project ") {
        project_name(line)
    } else {
        None
    }
}

/// Stem of the first `.csproj` path in the text.
pub(crate) fn project_name(text: &str) -> Option<&str> {
    PROJECT_RX
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().trim())
        .filter(|name| !name.is_empty())
}

/// Assembly name of a reference line: the stem of a module path, or the name of a fusion name.
pub(crate) fn assembly_name(text: &str) -> String {
    match MODULE_PATH_RX.captures(text).and_then(|captures| captures.get(1)) {
        Some(stem) => stem.as_str().to_string(),
        None => AssemblyIdentity::from_fusion_name(text.trim()).name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_coded_with_project() {
        let line = r"x.targets(2302,5): warning MSB3277:         C:\src\Bar\bin\Debug\Bar.dll [C:\src\App\App.csproj]";
        let coded = split_coded(line, "MSB3277:").unwrap();
        assert_eq!(coded.message, r"         C:\src\Bar\bin\Debug\Bar.dll");
        assert_eq!(coded.project, Some("App"));
    }

    #[test]
    fn test_split_coded_keeps_inner_brackets() {
        let line = r#"warning MSB3277:     References which depend on "Foo" [C:\p\Foo.dll]. [C:\src\App\App.csproj]"#;
        let coded = split_coded(line, "MSB3277:").unwrap();
        assert_eq!(
            coded.message,
            r#"     References which depend on "Foo" [C:\p\Foo.dll]."#
        );
        assert_eq!(coded.project, Some("App"));
    }

    #[test]
    fn test_split_coded_without_marker_or_project() {
        assert!(split_coded("Build succeeded.", "MSB3277:").is_none());

        let coded = split_coded("warning MSB3277: Found conflicts", "MSB3277:").unwrap();
        assert_eq!(coded.project, None);
    }

    #[test]
    fn test_classify_levels() {
        assert_eq!(
            classify(" Found conflicts between different versions of \"Foo\"."),
            Directive::ReportStart
        );
        assert_eq!(
            classify(r#"     References which depend on "Foo, Version=1.0.0.0" []."#),
            Directive::GroupStart("Foo, Version=1.0.0.0")
        );
        assert_eq!(
            classify(r"         C:\Bar.dll"),
            Directive::DirectRef(r"C:\Bar.dll")
        );
        assert_eq!(
            classify(r"             C:\Lib.dll"),
            Directive::TransitiveRef(r"C:\Lib.dll")
        );
        assert_eq!(
            classify("           Project file item includes which caused reference"),
            Directive::Continuation
        );
        assert!(matches!(
            classify("     References which depend on Foo"),
            Directive::Malformed(_)
        ));
    }

    #[test]
    fn test_assembly_name_forms() {
        assert_eq!(assembly_name(r"C:\src\Bar\bin\Debug\Bar.dll"), "Bar");
        assert_eq!(assembly_name(r"C:\tools\Runner.EXE"), "Runner");
        assert_eq!(assembly_name("Baz, Version=1.0.0.0, Culture=neutral"), "Baz");
        assert_eq!(assembly_name("Qux"), "Qux");
    }

    #[test]
    fn test_announced_project() {
        assert_eq!(
            announced_project(r#"Project "C:\src\App\App.csproj" on node 1 (default targets)."#),
            Some("App")
        );
        assert_eq!(
            announced_project(r#"Done Building Project "C:\src\App\App.csproj"."#),
            None
        );
        assert_eq!(announced_project(r#"Project "C:\src\App.sln" on node 1."#), None);
    }
}
