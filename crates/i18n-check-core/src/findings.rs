//! Finding types: warning ids, usage contexts, and extracted strings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Informational,
    Warning,
}

/// Stable bracketed warning tags.
///
/// The tag strings are a contract with downstream consumers (report filters,
/// the UI's per-warning ignore action) and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningId {
    NotL10nAvailable,
    SuspectL10nString,
    SuspectL10nUsage,
    PrintfMismatch,
    AcceleratorMismatch,
    TransInconsistency,
    L10nStringNeedsContext,
    UrlInL10nString,
    SpacesAroundL10nString,
    DeprecatedMacro,
    NonUtf8File,
    Utf8FileWithBom,
    UnencodedExtAscii,
    PrintfSingleNumber,
    NumberAssignedToId,
    DupValAssignedToIds,
    MalformedString,
    TrailingSpaces,
    FontIssue,
    Tabs,
    WideLine,
    CommentMissingSpace,
}

impl WarningId {
    pub const ALL: &'static [WarningId] = &[
        WarningId::NotL10nAvailable,
        WarningId::SuspectL10nString,
        WarningId::SuspectL10nUsage,
        WarningId::PrintfMismatch,
        WarningId::AcceleratorMismatch,
        WarningId::TransInconsistency,
        WarningId::L10nStringNeedsContext,
        WarningId::UrlInL10nString,
        WarningId::SpacesAroundL10nString,
        WarningId::DeprecatedMacro,
        WarningId::NonUtf8File,
        WarningId::Utf8FileWithBom,
        WarningId::UnencodedExtAscii,
        WarningId::PrintfSingleNumber,
        WarningId::NumberAssignedToId,
        WarningId::DupValAssignedToIds,
        WarningId::MalformedString,
        WarningId::TrailingSpaces,
        WarningId::FontIssue,
        WarningId::Tabs,
        WarningId::WideLine,
        WarningId::CommentMissingSpace,
    ];

    /// The bracketed tag used in reports.
    pub fn tag(self) -> &'static str {
        match self {
            WarningId::NotL10nAvailable => "[notL10NAvailable]",
            WarningId::SuspectL10nString => "[suspectL10NString]",
            WarningId::SuspectL10nUsage => "[suspectL10NUsage]",
            WarningId::PrintfMismatch => "[printfMismatch]",
            WarningId::AcceleratorMismatch => "[acceleratorMismatch]",
            WarningId::TransInconsistency => "[transInconsistency]",
            WarningId::L10nStringNeedsContext => "[L10NStringNeedsContext]",
            WarningId::UrlInL10nString => "[urlInL10NString]",
            WarningId::SpacesAroundL10nString => "[spacesAroundL10NString]",
            WarningId::DeprecatedMacro => "[deprecatedMacro]",
            WarningId::NonUtf8File => "[nonUTF8File]",
            WarningId::Utf8FileWithBom => "[UTF8FileWithBOM]",
            WarningId::UnencodedExtAscii => "[unencodedExtASCII]",
            WarningId::PrintfSingleNumber => "[printfSingleNumber]",
            WarningId::NumberAssignedToId => "[numberAssignedToId]",
            WarningId::DupValAssignedToIds => "[dupValAssignedToIds]",
            WarningId::MalformedString => "[malformedString]",
            WarningId::TrailingSpaces => "[trailingSpaces]",
            WarningId::FontIssue => "[fontIssue]",
            WarningId::Tabs => "[tabs]",
            WarningId::WideLine => "[wideLine]",
            WarningId::CommentMissingSpace => "[commentMissingSpace]",
        }
    }

    /// Parse a bracketed tag back into a warning id.
    pub fn from_tag(tag: &str) -> Option<WarningId> {
        WarningId::ALL.iter().copied().find(|id| id.tag() == tag)
    }
}

/// How an extracted string is used at its call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageContext {
    /// Argument of the named function.
    FunctionCall(String),
    /// Right-hand side of an assignment to the named variable.
    VariableAssignment(String),
    /// Value bound to a named parameter or macro.
    Parameter(String),
    /// No recognizable neighbor; carries the raw surrounding text.
    Orphan(String),
}

impl UsageContext {
    /// The identifier this context names, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            UsageContext::FunctionCall(name)
            | UsageContext::VariableAssignment(name)
            | UsageContext::Parameter(name) => Some(name),
            UsageContext::Orphan(_) => None,
        }
    }

    /// Human-readable description used as a report explanation.
    pub fn explain(&self) -> String {
        match self {
            UsageContext::FunctionCall(name) => format!("In function call: {name}"),
            UsageContext::VariableAssignment(name) => format!("Assigned to variable: {name}"),
            UsageContext::Parameter(name) => format!("Bound to: {name}"),
            UsageContext::Orphan(text) => text.clone(),
        }
    }
}

/// A single extracted string or check result.
///
/// Line and column are 1-based positions of the opening delimiter in the
/// original input, never in a post-processed copy. `offset` is the byte
/// offset of that delimiter and is the within-file ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringInfo {
    /// Extracted text, post-escape, pre-decoration.
    pub string: String,
    pub file_name: PathBuf,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub usage: UsageContext,
    /// Absent for plain records (e.g. a well-formed localizable string).
    pub warning_id: Option<WarningId>,
    pub severity: Severity,
    /// Pre-rendered report explanation.
    pub explanation: String,
}

impl StringInfo {
    /// An informational record with no warning attached.
    pub fn record(
        string: impl Into<String>,
        file_name: &Path,
        line: usize,
        column: usize,
        offset: usize,
        usage: UsageContext,
    ) -> Self {
        let explanation = usage.explain();
        Self {
            string: string.into(),
            file_name: file_name.to_path_buf(),
            line,
            column,
            offset,
            usage,
            warning_id: None,
            severity: Severity::Informational,
            explanation,
        }
    }

    /// A warning-level finding.
    pub fn warning(
        string: impl Into<String>,
        file_name: &Path,
        line: usize,
        column: usize,
        offset: usize,
        usage: UsageContext,
        warning_id: WarningId,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            string: string.into(),
            file_name: file_name.to_path_buf(),
            line,
            column,
            offset,
            usage,
            warning_id: Some(warning_id),
            severity: Severity::Warning,
            explanation: explanation.into(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Ordering key: file path, then byte offset.
    pub fn sort_key(&self) -> (&Path, usize) {
        (self.file_name.as_path(), self.offset)
    }

    /// Position identity used for duplicate collapsing.
    pub fn position_key(&self) -> (&str, &Path, usize) {
        (self.string.as_str(), self.file_name.as_path(), self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for id in WarningId::ALL {
            assert_eq!(WarningId::from_tag(id.tag()), Some(*id));
        }
    }

    #[test]
    fn test_tag_spelling_is_stable() {
        assert_eq!(WarningId::NotL10nAvailable.tag(), "[notL10NAvailable]");
        assert_eq!(WarningId::Utf8FileWithBom.tag(), "[UTF8FileWithBOM]");
        assert_eq!(
            WarningId::L10nStringNeedsContext.tag(),
            "[L10NStringNeedsContext]"
        );
        assert_eq!(WarningId::DupValAssignedToIds.tag(), "[dupValAssignedToIds]");
    }

    #[test]
    fn test_usage_explanations() {
        assert_eq!(
            UsageContext::FunctionCall("Format".into()).explain(),
            "In function call: Format"
        );
        assert_eq!(
            UsageContext::VariableAssignment("label".into()).explain(),
            "Assigned to variable: label"
        );
        assert_eq!(
            UsageContext::Orphan("return \"x\";".into()).explain(),
            "return \"x\";"
        );
    }

    #[test]
    fn test_record_is_informational() {
        let info = StringInfo::record(
            "Hello",
            Path::new("a.cpp"),
            3,
            9,
            42,
            UsageContext::FunctionCall("_".into()),
        );
        assert_eq!(info.severity, Severity::Informational);
        assert_eq!(info.warning_id, None);
        assert_eq!(info.explanation, "In function call: _");
        assert_eq!(info.sort_key(), (Path::new("a.cpp"), 42));
    }
}
