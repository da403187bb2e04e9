//! Proposal format validation.
//!
//! The validator checks the free-text blocks of a submission against the
//! section markers of the current submission template and collects every
//! violation in a fixed order:
//!
//! ```text
//! reading block:   name reading → affiliation → job title
//! abstract block:  biography header → summary header
//!                  (only when both headers exist) biography body → summary body
//! ```
//!
//! Violations are values, never errors. A record with no violations is
//! returned as [`ValidationOutcome::Accepted`].

pub mod extract;

use serde::Serialize;

use crate::domain::proposal::SubmissionRecord;

pub use extract::{extract_section, normalize_newlines, normalized_len};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    NameReading,
    Affiliation,
    JobTitle,
    BiographyHeader,
    SummaryHeader,
    BiographyBody,
    SummaryBody,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    MissingField,
    TooLong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LengthExcess {
    pub current: usize,
    pub maximum: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: RuleId,
    pub kind: ViolationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthExcess>,
}

impl Violation {
    fn missing(rule: RuleId, message: String) -> Self {
        Self { rule, kind: ViolationKind::MissingField, message, length: None }
    }

    fn too_long(rule: RuleId, label: &str, current: usize, maximum: usize) -> Self {
        Self {
            rule,
            kind: ViolationKind::TooLong,
            message: format!(
                "{label}の文字数がオーバーしています（現在：{current}文字、上限：{maximum}文字）"
            ),
            length: Some(LengthExcess { current, maximum }),
        }
    }
}

/// A submission that passed every rule. Only the validator constructs it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedSubmission(SubmissionRecord);

impl ValidatedSubmission {
    pub fn record(&self) -> &SubmissionRecord {
        &self.0
    }

    pub fn into_record(self) -> SubmissionRecord {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted { record: ValidatedSubmission },
    Rejected { violations: Vec<Violation> },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Accepted { .. } => &[],
            Self::Rejected { violations } => violations,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadingSection {
    pub rule: RuleId,
    pub label: &'static str,
    pub marker: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbstractSection {
    pub label: &'static str,
    pub header: &'static str,
    /// Where the body stops. Empty means end of text.
    pub end_markers: &'static [&'static str],
    pub max_chars: usize,
}

/// Marker strings and limits of one submission template version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationRules {
    pub reading_sections: [ReadingSection; 3],
    pub reading_end_markers: &'static [&'static str],
    pub biography: AbstractSection,
    pub summary: AbstractSection,
}

pub const BIOGRAPHY_MAX_CHARS: usize = 200;
pub const SUMMARY_MAX_CHARS: usize = 400;

pub const FORTEE_2025_RULES: ValidationRules = ValidationRules {
    reading_sections: [
        ReadingSection {
            rule: RuleId::NameReading,
            label: "お名前の呼び方（カナ）",
            marker: "■お名前の呼び方（カナ）□",
        },
        ReadingSection {
            rule: RuleId::Affiliation,
            label: "会社名/所属団体名",
            marker: "■会社名/所属団体名 - Company/Organizations□",
        },
        ReadingSection { rule: RuleId::JobTitle, label: "役職", marker: "■役職 - Job Title□" },
    ],
    reading_end_markers: &["■"],
    biography: AbstractSection {
        label: "スピーカープロフィール",
        header: "■スピーカープロフィール (200文字以内) - Biography (Less than 400 letters)□",
        end_markers: &["\r\n■", "\r■", "\n■"],
        max_chars: BIOGRAPHY_MAX_CHARS,
    },
    summary: AbstractSection {
        label: "トーク概要",
        header: "■ トーク概要 (400文字以内) - Abstract (Less than 800 letters)□",
        end_markers: &[],
        max_chars: SUMMARY_MAX_CHARS,
    },
};

impl Default for ValidationRules {
    fn default() -> Self {
        FORTEE_2025_RULES
    }
}

/// Stateless; safe to share across threads and call concurrently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Validator {
    rules: ValidationRules,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn validate(&self, record: &SubmissionRecord) -> ValidationOutcome {
        let mut violations = self.check_reading_block(&record.speaker_name_reading);
        violations.extend(self.check_abstract_block(&record.abstract_text));

        if violations.is_empty() {
            ValidationOutcome::Accepted { record: ValidatedSubmission(record.clone()) }
        } else {
            ValidationOutcome::Rejected { violations }
        }
    }

    fn check_reading_block(&self, text: &str) -> Vec<Violation> {
        self.rules
            .reading_sections
            .iter()
            .filter_map(|section| {
                let present = extract_section(text, section.marker, self.rules.reading_end_markers)
                    .is_some_and(|body| !body.trim().is_empty());
                (!present).then(|| {
                    Violation::missing(
                        section.rule,
                        format!("「{}」の項目に値がありません", section.label),
                    )
                })
            })
            .collect()
    }

    fn check_abstract_block(&self, text: &str) -> Vec<Violation> {
        let biography = &self.rules.biography;
        let summary = &self.rules.summary;

        let mut violations: Vec<Violation> = [
            (RuleId::BiographyHeader, biography),
            (RuleId::SummaryHeader, summary),
        ]
        .into_iter()
        .filter(|(_, section)| !text.contains(section.header))
        .map(|(rule, section)| {
            Violation::missing(rule, format!("「{}」が含まれていません", section.header))
        })
        .collect();

        // Body extraction is anchored on both headers.
        if !violations.is_empty() {
            return violations;
        }

        violations.extend(check_body(text, RuleId::BiographyBody, biography));
        violations.extend(check_body(text, RuleId::SummaryBody, summary));
        violations
    }
}

fn check_body(text: &str, rule: RuleId, section: &AbstractSection) -> Option<Violation> {
    let body = extract_section(text, section.header, section.end_markers)
        .map(str::trim)
        .filter(|body| !body.is_empty());

    let Some(body) = body else {
        return Some(Violation::missing(rule, format!("{}の本文が見つかりません", section.label)));
    };

    let current = normalized_len(body);
    (current > section.max_chars)
        .then(|| Violation::too_long(rule, section.label, current, section.max_chars))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{
        LengthExcess, RuleId, ValidationOutcome, Validator, ViolationKind, FORTEE_2025_RULES,
    };
    use crate::domain::proposal::{ProposalId, SubmissionRecord};

    const NAME: &str = "■お名前の呼び方（カナ）□";
    const AFFILIATION: &str = "■会社名/所属団体名 - Company/Organizations□";
    const JOB_TITLE: &str = "■役職 - Job Title□";
    const BIO: &str = "■スピーカープロフィール (200文字以内) - Biography (Less than 400 letters)□";
    const SUMMARY: &str = "■ トーク概要 (400文字以内) - Abstract (Less than 800 letters)□";

    fn reading_block() -> String {
        format!("{NAME}\r\nサトウ ハナコ\r\n{AFFILIATION}\r\nExample Inc.\r\n{JOB_TITLE}\r\nSRE")
    }

    fn abstract_block(bio: &str, summary: &str) -> String {
        format!("{BIO}\r\n{bio}\r\n{SUMMARY}\r\n{summary}")
    }

    fn record(reading: &str, abstract_text: &str) -> SubmissionRecord {
        SubmissionRecord {
            id: ProposalId(Uuid::nil()),
            title: "Platform teams in practice".to_string(),
            speaker_name: "Sato Hanako".to_string(),
            speaker_name_reading: reading.to_string(),
            abstract_text: abstract_text.to_string(),
            accepted: false,
        }
    }

    fn rules_of(outcome: &ValidationOutcome) -> Vec<RuleId> {
        outcome.violations().iter().map(|violation| violation.rule).collect()
    }

    #[test]
    fn accepts_record_at_both_length_limits() {
        let input = record(&reading_block(), &abstract_block(&"A".repeat(200), &"B".repeat(400)));
        let outcome = Validator::default().validate(&input);

        let ValidationOutcome::Accepted { record } = outcome else {
            panic!("expected accepted outcome, got {outcome:?}");
        };
        assert_eq!(record.record(), &input);
    }

    #[test]
    fn reports_missing_reading_sections_in_rule_order() {
        let input = record(&format!("{JOB_TITLE}\r\nSRE"), &abstract_block("bio", "summary"));
        let outcome = Validator::default().validate(&input);

        assert_eq!(rules_of(&outcome), vec![RuleId::NameReading, RuleId::Affiliation]);
        assert_eq!(
            outcome.violations()[0].message,
            "「お名前の呼び方（カナ）」の項目に値がありません"
        );
        assert_eq!(outcome.violations()[1].message, "「会社名/所属団体名」の項目に値がありません");
        assert!(outcome
            .violations()
            .iter()
            .all(|violation| violation.kind == ViolationKind::MissingField));
    }

    #[test]
    fn each_missing_reading_marker_is_reported_alone() {
        let cases = [
            (format!("{AFFILIATION}x{JOB_TITLE}y"), RuleId::NameReading),
            (format!("{NAME}x{JOB_TITLE}y"), RuleId::Affiliation),
            (format!("{NAME}x{AFFILIATION}y"), RuleId::JobTitle),
        ];

        for (reading, expected) in cases {
            let outcome = Validator::default().validate(&record(&reading, &abstract_block("b", "s")));
            assert_eq!(rules_of(&outcome), vec![expected], "reading block: {reading}");
        }
    }

    #[test]
    fn whitespace_only_section_counts_as_missing() {
        let reading = format!("{NAME} \r\n\t{AFFILIATION}Example{JOB_TITLE}SRE");
        let outcome = Validator::default().validate(&record(&reading, &abstract_block("b", "s")));

        assert_eq!(rules_of(&outcome), vec![RuleId::NameReading]);
        assert_eq!(outcome.violations()[0].kind, ViolationKind::MissingField);
        assert_eq!(outcome.violations()[0].length, None);
    }

    #[test]
    fn missing_summary_header_skips_body_checks() {
        let abstract_text = format!("{BIO}\r\n{}", "A".repeat(500));
        let outcome = Validator::default().validate(&record(&reading_block(), &abstract_text));

        assert_eq!(rules_of(&outcome), vec![RuleId::SummaryHeader]);
        assert_eq!(outcome.violations()[0].message, format!("「{SUMMARY}」が含まれていません"));
    }

    #[test]
    fn both_headers_missing_are_both_reported() {
        let outcome = Validator::default().validate(&record(&reading_block(), "free text only"));
        assert_eq!(rules_of(&outcome), vec![RuleId::BiographyHeader, RuleId::SummaryHeader]);
    }

    #[test]
    fn biography_one_over_limit_is_too_long() {
        let input = record(&reading_block(), &abstract_block(&"あ".repeat(201), "summary"));
        let outcome = Validator::default().validate(&input);

        assert_eq!(outcome.violations().len(), 1);
        let violation = &outcome.violations()[0];
        assert_eq!(violation.rule, RuleId::BiographyBody);
        assert_eq!(violation.kind, ViolationKind::TooLong);
        assert_eq!(violation.length, Some(LengthExcess { current: 201, maximum: 200 }));
        assert_eq!(
            violation.message,
            "スピーカープロフィールの文字数がオーバーしています（現在：201文字、上限：200文字）"
        );
    }

    #[test]
    fn summary_one_over_limit_is_too_long() {
        let input = record(&reading_block(), &abstract_block("bio", &"B".repeat(401)));
        let outcome = Validator::default().validate(&input);

        assert_eq!(rules_of(&outcome), vec![RuleId::SummaryBody]);
        assert_eq!(outcome.violations()[0].length, Some(LengthExcess { current: 401, maximum: 400 }));
    }

    #[test]
    fn mixed_newlines_are_counted_after_normalization() {
        // 200 letters plus five line breaks, written as a mix of \r\n and \n.
        let bio = format!(
            "{}\r\n{}\n{}\r\n{}\n{}\r\n{}",
            "a".repeat(40),
            "b".repeat(40),
            "c".repeat(40),
            "d".repeat(40),
            "e".repeat(20),
            "f".repeat(20)
        );
        let input = record(&reading_block(), &abstract_block(&bio, "summary"));
        let outcome = Validator::default().validate(&input);

        assert_eq!(outcome.violations().len(), 1);
        assert_eq!(outcome.violations()[0].length, Some(LengthExcess { current: 205, maximum: 200 }));
    }

    #[test]
    fn empty_bodies_are_missing_not_zero_length() {
        let abstract_text = format!("{BIO}\r\n   \r\n{SUMMARY}\r\n \r\n");
        let outcome = Validator::default().validate(&record(&reading_block(), &abstract_text));

        assert_eq!(rules_of(&outcome), vec![RuleId::BiographyBody, RuleId::SummaryBody]);
        assert_eq!(
            outcome.violations()[0].message,
            "スピーカープロフィールの本文が見つかりません"
        );
        assert_eq!(outcome.violations()[1].message, "トーク概要の本文が見つかりません");
    }

    #[test]
    fn biography_stops_at_next_marker_but_summary_runs_to_end() {
        let summary = format!("intro\r\n■ not a section\r\n{}", "C".repeat(10));
        let abstract_text =
            format!("{BIO}\r\n{}\r\n■Other□\r\n{}\r\n{SUMMARY}\r\n{summary}", "A".repeat(10), "Z".repeat(300));
        let outcome = Validator::default().validate(&record(&reading_block(), &abstract_text));

        assert!(outcome.is_accepted(), "unexpected violations: {:?}", outcome.violations());
    }

    #[test]
    fn mid_line_marker_does_not_end_the_biography() {
        let bio = format!("{} ■ {}", "A".repeat(100), "B".repeat(100));
        let outcome =
            Validator::default().validate(&record(&reading_block(), &abstract_block(&bio, "summary")));

        assert_eq!(rules_of(&outcome), vec![RuleId::BiographyBody]);
        assert_eq!(outcome.violations()[0].length, Some(LengthExcess { current: 203, maximum: 200 }));
    }

    #[test]
    fn reading_violations_precede_header_violations() {
        let outcome = Validator::default().validate(&record("", "no headers here"));

        assert_eq!(
            rules_of(&outcome),
            vec![
                RuleId::NameReading,
                RuleId::Affiliation,
                RuleId::JobTitle,
                RuleId::BiographyHeader,
                RuleId::SummaryHeader,
            ]
        );
    }

    #[test]
    fn violations_follow_full_rule_order() {
        let outcome = Validator::default().validate(&record(
            "",
            &abstract_block(&"A".repeat(300), &"B".repeat(500)),
        ));

        assert_eq!(
            rules_of(&outcome),
            vec![
                RuleId::NameReading,
                RuleId::Affiliation,
                RuleId::JobTitle,
                RuleId::BiographyBody,
                RuleId::SummaryBody,
            ]
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let validator = Validator::new(FORTEE_2025_RULES);
        let input = record("garbage", &abstract_block("", &"B".repeat(401)));

        assert_eq!(validator.validate(&input), validator.validate(&input));
    }
}
