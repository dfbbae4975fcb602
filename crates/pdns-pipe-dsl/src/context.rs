//! Mutable state shared by the handlers of one dispatch pass.

use pdns_pipe::{HandlerError, Query, Response};

/// State threaded through every handler run for a single query.
///
/// Handlers read the query and the capture groups of the pattern that
/// matched, add replies, or flag an error. One context is shared by all
/// handlers of a pass, so later handlers see the replies earlier ones added.
#[derive(Debug)]
pub struct Context<'q> {
    default_ttl: u32,
    query: &'q Query,
    qtype: String,
    matches: Vec<String>,
    error: Option<HandlerError>,
    answers: Vec<Response>,
}

impl<'q> Context<'q> {
    /// Creates an empty context for `query`.
    #[must_use]
    pub fn new(query: &'q Query, default_ttl: u32) -> Self {
        Self {
            default_ttl,
            query,
            qtype: query.qtype.clone(),
            matches: Vec::new(),
            error: None,
            answers: Vec::new(),
        }
    }

    /// The query being answered. Its type may be `ANY`.
    #[must_use]
    pub const fn query(&self) -> &'q Query {
        self.query
    }

    /// Record type the current handler was registered for.
    #[must_use]
    pub fn qtype(&self) -> &str {
        &self.qtype
    }

    /// Capture groups of the pattern that matched, whole match excluded.
    /// Groups that did not participate in the match are empty strings.
    #[must_use]
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    /// Capture group `index` (zero-based, whole match excluded).
    #[must_use]
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.matches.get(index).map(String::as_str)
    }

    /// TTL given to replies that do not set one.
    #[must_use]
    pub const fn default_ttl(&self) -> u32 {
        self.default_ttl
    }

    /// Changes the TTL used by [`Context::reply`] for the rest of the pass.
    pub const fn set_default_ttl(&mut self, ttl: u32) {
        self.default_ttl = ttl;
    }

    /// Replies accumulated so far in this pass.
    #[must_use]
    pub fn answers(&self) -> &[Response] {
        &self.answers
    }

    /// Error flagged during this pass, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&HandlerError> {
        self.error.as_ref()
    }

    /// Whether a handler or the hook has flagged an error.
    #[must_use]
    pub const fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Flags an error. The first error of a pass sticks; later ones are
    /// ignored. Once set, no further handlers run and every reply of the
    /// pass is discarded.
    pub fn fail(&mut self, error: impl Into<HandlerError>) {
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }

    /// Adds a reply for the queried name with the default TTL.
    pub fn reply(&mut self, content: impl Into<String>) {
        let name = self.query.name.clone();
        self.reply_extra(name, content, self.default_ttl);
    }

    /// Adds a reply for the queried name with an explicit TTL.
    pub fn reply_ttl(&mut self, content: impl Into<String>, ttl: u32) {
        let name = self.query.name.clone();
        self.reply_extra(name, content, ttl);
    }

    /// Adds a reply with an explicit owner name and TTL.
    ///
    /// The reply takes the query's class and id and the record type the
    /// handler was registered for, which differs from the query's type when
    /// answering `ANY`.
    pub fn reply_extra(&mut self, name: impl Into<String>, content: impl Into<String>, ttl: u32) {
        self.answers.push(Response::new(
            name,
            self.query.class.as_str(),
            self.qtype.as_str(),
            ttl,
            self.query.id.as_str(),
            content,
        ));
    }

    pub(crate) fn set_qtype(&mut self, qtype: &str) {
        qtype.clone_into(&mut self.qtype);
    }

    /// Installs new capture groups and hands back the previous ones.
    pub(crate) const fn replace_matches(&mut self, matches: Vec<String>) -> Vec<String> {
        std::mem::replace(&mut self.matches, matches)
    }

    /// Ends the pass: the error alone if one was flagged, else the replies.
    pub(crate) fn finish(self) -> Result<Vec<Response>, HandlerError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.answers),
        }
    }
}
