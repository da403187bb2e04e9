use regex::Regex;

use crate::domain::proposal::ProposalId;

/// URLs of one event on the CFP platform, e.g.
/// `https://fortee.jp/platform-engineering-kaigi-2025`.
#[derive(Clone, Debug)]
pub struct ProposalLinks {
    base_url: String,
    pattern: Regex,
}

impl ProposalLinks {
    pub fn new(base_url: &str) -> Result<Self, regex::Error> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let pattern = Regex::new(&format!(
            r"(?i){}/proposal/([a-f\d]{{8}}-[a-f\d]{{4}}-[a-f\d]{{4}}-[a-f\d]{{4}}-[a-f\d]{{12}})",
            regex::escape(&base_url)
        ))?;
        Ok(Self { base_url, pattern })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn proposal_url(&self, id: &ProposalId) -> String {
        format!("{}/proposal/{id}", self.base_url)
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    /// First proposal id linked from a chat message.
    pub fn extract_proposal_id(&self, text: &str) -> Option<ProposalId> {
        let captures = self.pattern.captures(text)?;
        ProposalId::parse(captures.get(1)?.as_str()).ok()
    }
}
