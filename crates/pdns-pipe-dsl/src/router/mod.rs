//! Pattern-matched handler registry and dispatch.
//!
//! Handlers are registered per record type against a regular expression that
//! is matched against the query name. Dispatch order is fixed and
//! reproducible, which matters to resolvers configured not to shuffle
//! answers:
//!
//! 1. record types run in the order a handler was *first* registered for
//!    them (only relevant for `ANY` queries, which run every type);
//! 2. within a type, handlers run in registration order.
//!
//! Patterns are used as given. Nothing anchors them, so `example\.com`
//! also matches `www.example.com.evil`; anchor with `^...$` when that
//! matters.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use tracing::{debug, trace};

use pdns_pipe::{HandlerError, Query, Response};

use crate::context::Context;

/// Tracing target for dispatch activity.
pub(crate) const ROUTER_TARGET: &str = "pdns_pipe_dsl::router";

/// TTL used by [`Router::new`].
pub const DEFAULT_TTL: u32 = 3600;

/// Callback invoked with the shared per-query [`Context`].
pub type Handler = Box<dyn Fn(&mut Context<'_>) + Send + Sync>;

struct Registration {
    pattern: Regex,
    handler: Handler,
    index: usize,
}

/// Ordered registry of handlers keyed by record type.
pub struct Router {
    registrations: HashMap<String, Vec<Registration>>,
    discovery_order: Vec<String>,
    default_ttl: u32,
    before: Option<Handler>,
    registered: usize,
}

macro_rules! record_type_shortcuts {
    ($($method:ident => $qtype:literal),+ $(,)?) => {
        $(
            #[doc = concat!("Registers a handler for `", $qtype, "` records.")]
            ///
            /// # Errors
            ///
            /// Returns the compilation error when `pattern` is not a valid
            /// regular expression.
            pub fn $method<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, regex::Error>
            where
                F: Fn(&mut Context<'_>) + Send + Sync + 'static,
            {
                self.register_str($qtype, pattern, handler)
            }
        )+
    };
}

impl Router {
    /// Creates an empty router whose replies default to a one hour TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates an empty router with an explicit default TTL.
    #[must_use]
    pub fn with_ttl(default_ttl: u32) -> Self {
        Self {
            registrations: HashMap::new(),
            discovery_order: Vec::new(),
            default_ttl,
            before: None,
            registered: 0,
        }
    }

    /// TTL given to replies that do not set one.
    #[must_use]
    pub const fn default_ttl(&self) -> u32 {
        self.default_ttl
    }

    /// Record types in the order they were first registered.
    #[must_use]
    pub fn record_types(&self) -> &[String] {
        &self.discovery_order
    }

    /// Sets the hook run on every pattern match, before the matched handler.
    ///
    /// The hook may mutate the context or flag an error with
    /// [`Context::fail`], which stops the matched handler (and the rest of
    /// the pass) from running. Setting a new hook replaces the previous one.
    pub fn before<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    /// Registers `handler` for queries of `record_type` whose name matches
    /// `pattern`.
    ///
    /// If the pattern has capture groups, the captured text is available
    /// through [`Context::matches`] while the handler runs.
    pub fn register<F>(
        &mut self,
        record_type: impl Into<String>,
        pattern: Regex,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        let qtype = record_type.into();
        if !self.discovery_order.contains(&qtype) {
            self.discovery_order.push(qtype.clone());
        }

        debug!(
            target: ROUTER_TARGET,
            qtype = %qtype,
            pattern = pattern.as_str(),
            index = self.registered,
            "registered handler"
        );
        self.registrations
            .entry(qtype)
            .or_default()
            .push(Registration {
                pattern,
                handler: Box::new(handler),
                index: self.registered,
            });
        self.registered += 1;
        self
    }

    /// Compiles `pattern` and registers `handler` for it.
    ///
    /// # Errors
    ///
    /// Returns the compilation error when `pattern` is not a valid regular
    /// expression; nothing is registered in that case.
    pub fn register_str<F>(
        &mut self,
        qtype: impl Into<String>,
        pattern: &str,
        handler: F,
    ) -> Result<&mut Self, regex::Error>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        let compiled = Regex::new(pattern)?;
        Ok(self.register(qtype, compiled, handler))
    }

    record_type_shortcuts! {
        a => "A",
        aaaa => "AAAA",
        cname => "CNAME",
        mx => "MX",
        ns => "NS",
        ptr => "PTR",
        soa => "SOA",
        srv => "SRV",
        sshfp => "SSHFP",
        txt => "TXT",
    }

    /// Runs every matching handler for `query` and collects their replies.
    ///
    /// A query of type `ANY` runs the handlers of every registered type, in
    /// discovery order; any other type runs only its own handlers. The pass
    /// stops at the first handler (or hook) that flags an error, and then
    /// only that error is returned: replies added earlier in the pass are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns the first error flagged through [`Context::fail`].
    pub fn lookup(&self, query: &Query) -> Result<Vec<Response>, HandlerError> {
        let mut context = Context::new(query, self.default_ttl);
        let candidates = if query.is_any() {
            self.discovery_order.as_slice()
        } else {
            std::slice::from_ref(&query.qtype)
        };

        for qtype in candidates {
            context.set_qtype(qtype);
            let Some(registrations) = self.registrations.get(qtype) else {
                continue;
            };
            for registration in registrations {
                self.run_registration(&mut context, registration);
                if context.has_failed() {
                    debug!(
                        target: ROUTER_TARGET,
                        qtype = %qtype,
                        index = registration.index,
                        name = %query.name,
                        "dispatch aborted by handler error"
                    );
                    return context.finish();
                }
            }
        }

        context.finish()
    }

    fn run_registration(&self, context: &mut Context<'_>, registration: &Registration) {
        let name = context.query().name.as_str();
        let Some(captures) = registration.pattern.captures(name) else {
            return;
        };
        trace!(
            target: ROUTER_TARGET,
            index = registration.index,
            pattern = registration.pattern.as_str(),
            name,
            "pattern matched"
        );

        let groups = captures
            .iter()
            .skip(1)
            .map(|group| group.map_or_else(String::new, |found| found.as_str().to_owned()))
            .collect();
        let previous = context.replace_matches(groups);

        if let Some(hook) = &self.before {
            hook(context);
        }
        if !context.has_failed() {
            (registration.handler)(context);
        }

        context.replace_matches(previous);
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("record_types", &self.discovery_order)
            .field("registered", &self.registered)
            .field("default_ttl", &self.default_ttl)
            .field("has_before_hook", &self.before.is_some())
            .finish_non_exhaustive()
    }
}

/// Lists registrations in dispatch order, one `TYPE\t:\tpattern` per line.
impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qtype in &self.discovery_order {
            for registration in self.registrations.get(qtype).into_iter().flatten() {
                writeln!(f, "{qtype}\t:\t{}", registration.pattern)?;
            }
        }
        Ok(())
    }
}
