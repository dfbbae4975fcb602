//! Sample zone answered by the echo worker.
//!
//! The zone apex has SOA, NS, A and AAAA records and `www` mirrors the apex
//! addresses. Any name under `echo.<zone>` answers TXT queries with the
//! labels in front of it, so `hello.echo.example.com` yields `"hello"`.

use pdns_pipe_dsl::{Context, Router};

/// Zone served when none is supplied.
pub const SAMPLE_ZONE: &str = "example.com";

const IPV4: &str = "192.0.2.1";
const IPV6: &str = "2001:db8::1";

/// Builds the router for `zone`, replying with `default_ttl`.
///
/// # Errors
///
/// Returns the compilation error when a pattern built from `zone` is
/// rejected, which only happens for names far beyond DNS limits.
pub fn sample_router(zone: &str, default_ttl: u32) -> Result<Router, regex::Error> {
    let apex_name = regex::escape(zone);
    let apex = format!("^{apex_name}$");
    let host = format!(r"^(?:www\.)?{apex_name}$");
    let echo = format!(r"^(.+)\.echo\.{apex_name}$");

    let soa = format!("ns1.{zone}. hostmaster.{zone}. 1 3600 600 604800 {default_ttl}");
    let primary = format!("ns1.{zone}.");
    let secondary = format!("ns2.{zone}.");

    let mut router = Router::with_ttl(default_ttl);
    router
        .soa(&apex, move |ctx: &mut Context<'_>| ctx.reply(soa.as_str()))?
        .ns(&apex, move |ctx: &mut Context<'_>| {
            ctx.reply(primary.as_str());
            ctx.reply(secondary.as_str());
        })?
        .a(&host, |ctx: &mut Context<'_>| ctx.reply(IPV4))?
        .aaaa(&host, |ctx: &mut Context<'_>| ctx.reply(IPV6))?
        .txt(&echo, echo_labels)?;
    Ok(router)
}

fn echo_labels(ctx: &mut Context<'_>) {
    let labels = ctx.capture(0).unwrap_or_default();
    let text = format!("\"{}\"", labels.replace('"', "\\\""));
    ctx.reply(text);
}
