//! Router-backed sessions driven through the wire protocol.

use std::io::Cursor;

use pdns_pipe::{Backend, ProtocolVersion};
use rstest::rstest;

use crate::{Context, Router};

type TestBackend = Backend<Cursor<Vec<u8>>, Vec<u8>>;

fn session(input: &str) -> TestBackend {
    Backend::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), "MyBackend")
}

fn output(backend: &TestBackend) -> &str {
    std::str::from_utf8(backend.writer()).expect("utf8 output")
}

fn example_router() -> Router {
    let mut router = Router::new();
    router
        .a(r"^example\.com$", |ctx: &mut Context<'_>| ctx.reply("1.2.3.4"))
        .and_then(|r| {
            r.txt(r"^(\w+)\.example\.com$", |ctx: &mut Context<'_>| {
                let label = ctx.capture(0).unwrap_or_default().to_owned();
                ctx.reply(label);
            })
        })
        .and_then(|r| {
            r.a(r"^broken\.example\.com$", |ctx: &mut Context<'_>| {
                ctx.fail("upstream\nunavailable");
            })
        })
        .expect("patterns should compile");
    router
}

#[rstest]
fn answers_an_a_query_at_version_three() {
    let router = example_router();
    let mut backend = session(
        "HELO\t3\nQ\texample.com\tIN\tA\t77\t192.0.2.1\t192.0.2.2\t\n",
    );

    assert_eq!(backend.negotiate().expect("negotiate"), ProtocolVersion::V3);
    backend.run(|query| router.lookup(query)).expect("run");

    assert_eq!(
        output(&backend),
        "OK\tMyBackend\nDATA\t\t\texample.com\tIN\tA\t3600\t77\t1.2.3.4\nEND\n"
    );
}

#[rstest]
fn any_query_collects_every_matching_type() {
    let router = example_router();
    let mut backend = session("HELO\t1\nQ\twww.example.com\tIN\tANY\t5\t192.0.2.1\n");

    backend.negotiate().expect("negotiate");
    backend.run(|query| router.lookup(query)).expect("run");

    assert_eq!(
        output(&backend),
        "OK\tMyBackend\nDATA\twww.example.com\tIN\tTXT\t3600\t5\twww\nEND\n"
    );
}

#[rstest]
fn handler_failures_become_log_and_fail() {
    let router = example_router();
    let mut backend = session(
        "HELO\t2\nQ\tbroken.example.com\tIN\tA\t9\t192.0.2.1\t192.0.2.2\nPING\n",
    );

    backend.negotiate().expect("negotiate");
    backend.run(|query| router.lookup(query)).expect("run");

    assert_eq!(
        output(&backend),
        "OK\tMyBackend\nLOG\tError handling line: upstream unavailable\nFAIL\nEND\n"
    );
}

#[rstest]
fn unmatched_names_get_an_empty_answer() {
    let router = example_router();
    let mut backend = session("HELO\t1\nQ\tnowhere.test\tIN\tA\t1\t192.0.2.1\n");

    backend.negotiate().expect("negotiate");
    backend.run(|query| router.lookup(query)).expect("run");

    assert_eq!(output(&backend), "OK\tMyBackend\nEND\n");
}
