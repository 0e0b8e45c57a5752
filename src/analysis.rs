//! Finding and fetching analysis reports.
//!
//! A build that ran the CodeSonar tool leaves a `codesonar: <url>` marker in
//! its log. This service turns that marker (or, failing that, the hub's
//! project index) into parsed [`Analysis`] reports, optionally narrowed by
//! the hub's warning filters.

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};
use crate::transport::HubSession;
use crate::xml::{Analysis, ProjectIndex};

/// Hub filter code meaning "warnings new in this analysis".
const NEW_WARNINGS_FILTER: &str = "4";

pub struct AnalysisService<'a> {
    session: &'a HubSession,
    log_marker: Regex,
}

impl<'a> AnalysisService<'a> {
    pub fn new(session: &'a HubSession) -> Result<Self> {
        // Whole-line match: the marker is a line of its own in the build log.
        let log_marker = Regex::new(r"^codesonar:\s+(.*/analysis/.*)$")
            .map_err(|e| Error::Config(format!("bad log marker pattern: {e}")))?;
        Ok(AnalysisService {
            session,
            log_marker,
        })
    }

    /// Scan the build log for the analysis URL. The LAST marker wins: a
    /// rebuild in the same log supersedes earlier runs.
    ///
    /// A `.html`-suffixed URL is rewritten to its `.xml` counterpart by
    /// replacing every literal `.html` in the string, not only the suffix.
    /// A URL with `.html` mid-path gets that occurrence rewritten too.
    /// Long-standing behavior that hub links have been observed to satisfy;
    /// do not narrow to a suffix rewrite without hub-side confirmation.
    pub fn analysis_url_from_log<S: AsRef<str>>(&self, lines: &[S]) -> Option<String> {
        let mut analysis_url = None;
        for line in lines {
            if let Some(captures) = self.log_marker.captures(line.as_ref()) {
                analysis_url = Some(captures[1].to_string());
            }
        }

        analysis_url.map(|url| {
            if url.ends_with(".html") {
                url.replace(".html", ".xml")
            } else {
                url
            }
        })
    }

    /// Resolve the newest analysis of a project through the hub index at
    /// `{base}/index.xml`. Naming a project the index does not list is a
    /// configuration error.
    pub fn latest_analysis_url(&self, base: &Url, project_name: &str) -> Result<String> {
        let index_url = join(base, "/index.xml")?;
        let body = self.session.get_ok(index_url)?;
        let index = ProjectIndex::parse(&body)?;
        let project = index.project_by_name(project_name)?;
        Ok(join(base, &project.url)?.to_string())
    }

    /// Fetch and parse the report at `url`, no filter applied.
    pub fn analysis_from_url(&self, url: &str) -> Result<Analysis> {
        let url = parse_url(url)?;
        let body = self.session.get_ok(url)?;
        Analysis::parse(&body)
    }

    /// Re-fetch restricted to warnings new in this analysis.
    pub fn analysis_with_new_warnings(&self, url: &str) -> Result<Analysis> {
        self.analysis_from_url(with_filter(url, NEW_WARNINGS_FILTER)?.as_str())
    }

    /// Re-fetch through a hub-defined visibility filter code. The code is a
    /// per-call argument, so the same service value can serve builds with
    /// different filters.
    pub fn analysis_with_visibility_filter(&self, url: &str, code: &str) -> Result<Analysis> {
        self.analysis_from_url(with_filter(url, code)?.as_str())
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Config(format!("bad analysis URL '{raw}': {e}")))
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::Config(format!("bad hub address '{base}': {e}")))
}

/// Append `filter=<code>` to the URL's query, keeping whatever query
/// parameters it already carries.
fn with_filter(raw: &str, code: &str) -> Result<Url> {
    let mut url = parse_url(raw)?;
    url.query_pairs_mut().append_pair("filter", code);
    Ok(url)
}
