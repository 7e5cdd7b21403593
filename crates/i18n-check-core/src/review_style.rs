//! The review-style bit-set: which checks a run performs.

use crate::findings::WarningId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Bit-set of independent checks.
    ///
    /// Each warning id maps to exactly one bit (see
    /// [`ReviewStyle::for_warning`]); a finding is only ever emitted when its
    /// bit is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ReviewStyle: u32 {
        /// Flag suspicious strings inside translation calls.
        const CHECK_L10N_STRINGS = 1 << 0;
        /// Flag plain strings that look translatable.
        const CHECK_NOT_AVAILABLE_FOR_L10N = 1 << 1;
        /// Flag translatable strings used in debug/log/exception contexts.
        const CHECK_SUSPECT_L10N_USAGE = 1 << 2;
        /// Compare msgid vs msgstr format specifiers.
        const CHECK_MISMATCHING_PRINTF_COMMANDS = 1 << 3;
        /// Require `&` accelerators on both sides of a translation pair.
        const CHECK_ACCELERATORS = 1 << 4;
        /// Whitespace/punctuation consistency across translation pairs.
        const CHECK_CONSISTENCY = 1 << 5;
        /// Short strings lacking a context comment.
        const CHECK_NEEDING_CONTEXT = 1 << 6;
        const CHECK_L10N_CONTAINS_URL = 1 << 7;
        const CHECK_L10N_HAS_SURROUNDING_SPACES = 1 << 8;
        const CHECK_DEPRECATED_MACROS = 1 << 9;
        const CHECK_UTF8_ENCODED = 1 << 10;
        const CHECK_UTF8_WITH_SIGNATURE = 1 << 11;
        const CHECK_UNENCODED_EXT_ASCII = 1 << 12;
        const CHECK_PRINTF_SINGLE_NUMBER = 1 << 13;
        const CHECK_NUMBER_ASSIGNED_TO_ID = 1 << 14;
        const CHECK_DUPLICATE_VALUE_ASSIGNED_TO_IDS = 1 << 15;
        const CHECK_MALFORMED_STRINGS = 1 << 16;
        const CHECK_TRAILING_SPACES = 1 << 17;
        const CHECK_FONTS = 1 << 18;
        const CHECK_TABS = 1 << 19;
        const CHECK_LINE_WIDTH = 1 << 20;
        const CHECK_SPACE_AFTER_COMMENT = 1 << 21;

        /// Every localization check (excludes the source-style checks:
        /// trailing spaces, tabs, line width, comment spacing).
        const ALL_L10N_CHECKS = Self::CHECK_L10N_STRINGS.bits()
            | Self::CHECK_NOT_AVAILABLE_FOR_L10N.bits()
            | Self::CHECK_SUSPECT_L10N_USAGE.bits()
            | Self::CHECK_MISMATCHING_PRINTF_COMMANDS.bits()
            | Self::CHECK_ACCELERATORS.bits()
            | Self::CHECK_CONSISTENCY.bits()
            | Self::CHECK_NEEDING_CONTEXT.bits()
            | Self::CHECK_L10N_CONTAINS_URL.bits()
            | Self::CHECK_L10N_HAS_SURROUNDING_SPACES.bits()
            | Self::CHECK_DEPRECATED_MACROS.bits()
            | Self::CHECK_UTF8_ENCODED.bits()
            | Self::CHECK_UTF8_WITH_SIGNATURE.bits()
            | Self::CHECK_UNENCODED_EXT_ASCII.bits()
            | Self::CHECK_PRINTF_SINGLE_NUMBER.bits()
            | Self::CHECK_NUMBER_ASSIGNED_TO_ID.bits()
            | Self::CHECK_DUPLICATE_VALUE_ASSIGNED_TO_IDS.bits()
            | Self::CHECK_MALFORMED_STRINGS.bits()
            | Self::CHECK_FONTS.bits();
    }
}

impl Default for ReviewStyle {
    fn default() -> Self {
        ReviewStyle::ALL_L10N_CHECKS
    }
}

impl ReviewStyle {
    /// The bit that gates the given warning id.
    ///
    /// Callers can subtract a check by its bracketed tag, the way the
    /// original UI's "ignore this warning" action clears a style bit.
    pub fn for_warning(id: WarningId) -> ReviewStyle {
        match id {
            WarningId::SuspectL10nString => ReviewStyle::CHECK_L10N_STRINGS,
            WarningId::NotL10nAvailable => ReviewStyle::CHECK_NOT_AVAILABLE_FOR_L10N,
            WarningId::SuspectL10nUsage => ReviewStyle::CHECK_SUSPECT_L10N_USAGE,
            WarningId::PrintfMismatch => ReviewStyle::CHECK_MISMATCHING_PRINTF_COMMANDS,
            WarningId::AcceleratorMismatch => ReviewStyle::CHECK_ACCELERATORS,
            WarningId::TransInconsistency => ReviewStyle::CHECK_CONSISTENCY,
            WarningId::L10nStringNeedsContext => ReviewStyle::CHECK_NEEDING_CONTEXT,
            WarningId::UrlInL10nString => ReviewStyle::CHECK_L10N_CONTAINS_URL,
            WarningId::SpacesAroundL10nString => ReviewStyle::CHECK_L10N_HAS_SURROUNDING_SPACES,
            WarningId::DeprecatedMacro => ReviewStyle::CHECK_DEPRECATED_MACROS,
            WarningId::NonUtf8File => ReviewStyle::CHECK_UTF8_ENCODED,
            WarningId::Utf8FileWithBom => ReviewStyle::CHECK_UTF8_WITH_SIGNATURE,
            WarningId::UnencodedExtAscii => ReviewStyle::CHECK_UNENCODED_EXT_ASCII,
            WarningId::PrintfSingleNumber => ReviewStyle::CHECK_PRINTF_SINGLE_NUMBER,
            WarningId::NumberAssignedToId => ReviewStyle::CHECK_NUMBER_ASSIGNED_TO_ID,
            WarningId::DupValAssignedToIds => {
                ReviewStyle::CHECK_DUPLICATE_VALUE_ASSIGNED_TO_IDS
            }
            WarningId::MalformedString => ReviewStyle::CHECK_MALFORMED_STRINGS,
            WarningId::TrailingSpaces => ReviewStyle::CHECK_TRAILING_SPACES,
            WarningId::FontIssue => ReviewStyle::CHECK_FONTS,
            WarningId::Tabs => ReviewStyle::CHECK_TABS,
            WarningId::WideLine => ReviewStyle::CHECK_LINE_WIDTH,
            WarningId::CommentMissingSpace => ReviewStyle::CHECK_SPACE_AFTER_COMMENT,
        }
    }

    /// Whether findings with the given warning id may be emitted.
    pub fn enables(self, id: WarningId) -> bool {
        self.intersects(Self::for_warning(id))
    }
}
