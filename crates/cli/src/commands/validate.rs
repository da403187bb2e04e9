//! Offline validation of a proposal export.

use std::fs;
use std::path::Path;

use cfpbot_core::domain::proposal::{ProposalListResponse, SubmissionRecord};
use cfpbot_core::validation::{ValidationOutcome, Validator, Violation};
use serde::Serialize;

use crate::commands::CommandResult;

pub const REJECTED_EXIT_CODE: u8 = 1;

#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
    command: &'static str,
    status: &'static str,
    total: usize,
    accepted: usize,
    rejected: usize,
    proposals: Vec<ProposalReport<'a>>,
}

#[derive(Debug, Serialize)]
struct ProposalReport<'a> {
    id: String,
    title: &'a str,
    speaker: &'a str,
    accepted: bool,
    violations: &'a [Violation],
}

pub fn run(path: &Path) -> CommandResult {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "validate",
                "input_read",
                format!("could not read `{}`: {error}", path.display()),
                2,
            );
        }
    };
    let response: ProposalListResponse = match serde_json::from_str(&raw) {
        Ok(response) => response,
        Err(error) => {
            return CommandResult::failure(
                "validate",
                "input_decode",
                format!("`{}` is not a proposal list: {error}", path.display()),
                3,
            );
        }
    };

    let validator = Validator::default();
    let outcomes: Vec<(SubmissionRecord, ValidationOutcome)> = response
        .proposals
        .iter()
        .map(SubmissionRecord::from)
        .map(|record| {
            let outcome = validator.validate(&record);
            (record, outcome)
        })
        .collect();

    let proposals: Vec<ProposalReport<'_>> = outcomes
        .iter()
        .map(|(record, outcome)| ProposalReport {
            id: record.id.to_string(),
            title: &record.title,
            speaker: &record.speaker_name,
            accepted: outcome.is_accepted(),
            violations: outcome.violations(),
        })
        .collect();
    let accepted = proposals.iter().filter(|proposal| proposal.accepted).count();
    let rejected = proposals.len() - accepted;

    let report = ValidationReport {
        command: "validate",
        status: if rejected == 0 { "ok" } else { "rejected" },
        total: proposals.len(),
        accepted,
        rejected,
        proposals,
    };
    let exit_code = if rejected == 0 { 0 } else { REJECTED_EXIT_CODE };

    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult { exit_code, output },
        Err(error) => CommandResult::failure("validate", "serialization", error.to_string(), 4),
    }
}
