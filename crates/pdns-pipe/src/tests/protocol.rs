//! Request loop tests driven through in-memory channels.

use rstest::rstest;

use crate::{HandlerError, ProtocolVersion, Query, Response};

use super::support::{
    answers, empty_dispatch, fake_query_line, fake_response, fake_response_line, negotiated,
};

#[rstest]
#[case(ProtocolVersion::V1, "Q\texample.com\tIN\tANY\t-1\t127.0.0.2\n")]
#[case(ProtocolVersion::V2, "Q\texample.com\tIN\tANY\t-1\t127.0.0.2\t127.0.0.1\n")]
#[case(
    ProtocolVersion::V3,
    "Q\texample.com\tIN\tANY\t-1\t127.0.0.2\t127.0.0.1\t127.0.0.3\n"
)]
fn fake_queries_serialise_per_version(#[case] version: ProtocolVersion, #[case] line: &str) {
    assert_eq!(fake_query_line(version), line);
}

#[rstest]
#[case(ProtocolVersion::V1)]
#[case(ProtocolVersion::V2)]
#[case(ProtocolVersion::V3)]
fn negotiated_version_governs_query_decoding(#[case] version: ProtocolVersion) {
    let well_formed = fake_query_line(version);
    let long = format!("{}\tfoo\n", well_formed.trim_end_matches('\n'));
    let requests = format!("{well_formed}Q\tfoo\n{long}");

    let mut backend = negotiated(version, &requests);
    backend.run(empty_dispatch).expect("run");

    let failure = format!(
        "LOG\tError handling line: v{} query should have {} data parts\nFAIL\n",
        version.number(),
        version.query_fields()
    );
    assert_eq!(answers(&backend), format!("END\n{failure}{failure}"));
}

#[rstest]
fn queries_are_passed_to_the_handler() {
    let expected = fake_query_line(ProtocolVersion::V3);
    let mut backend = negotiated(ProtocolVersion::V3, &expected);
    let mut seen: Vec<Query> = Vec::new();

    backend
        .run(|query| {
            seen.push(query.clone());
            Ok(Vec::new())
        })
        .expect("run");

    assert_eq!(seen.len(), 1, "exactly one dispatch expected");
    assert_eq!(seen.first().map(Query::encode), Some(Ok(expected)));
    assert_eq!(answers(&backend), "END\n");
}

#[rstest]
fn responses_from_the_handler_are_written_in_order() {
    let mut backend = negotiated(ProtocolVersion::V3, &fake_query_line(ProtocolVersion::V3));
    let response = fake_response(ProtocolVersion::V3);

    backend
        .run(|_| Ok(vec![response.clone(), response.clone()]))
        .expect("run");

    let line = fake_response_line(ProtocolVersion::V3);
    assert_eq!(answers(&backend), format!("{line}{line}END\n"));
}

#[rstest]
fn responses_are_stamped_with_the_negotiated_version() {
    let mut backend = negotiated(ProtocolVersion::V1, &fake_query_line(ProtocolVersion::V1));

    backend
        .run(|_| Ok(vec![fake_response(ProtocolVersion::V3).at_version(ProtocolVersion::V3)]))
        .expect("run");

    assert_eq!(
        answers(&backend),
        "DATA\texample.com\tIN\tANY\t3600\t-1\tfoo\nEND\n"
    );
}

#[rstest]
fn handler_errors_suppress_responses() {
    let mut backend = negotiated(ProtocolVersion::V3, &fake_query_line(ProtocolVersion::V3));

    backend
        .run(|_| -> Result<Vec<Response>, HandlerError> { Err(HandlerError::new("Test\nerror")) })
        .expect("run");

    assert_eq!(
        answers(&backend),
        "LOG\tError handling line: Test error\nFAIL\n"
    );
}

#[rstest]
#[case(ProtocolVersion::V1)]
#[case(ProtocolVersion::V2)]
#[case(ProtocolVersion::V3)]
fn ping_yields_a_bare_end(#[case] version: ProtocolVersion) {
    let mut backend = negotiated(version, "PING\n");
    backend.run(empty_dispatch).expect("run");
    assert_eq!(answers(&backend), "END\n");
}

#[rstest]
fn axfr_is_not_supported() {
    let mut backend = negotiated(ProtocolVersion::V3, "AXFR\n");
    backend.run(empty_dispatch).expect("run");
    assert_eq!(
        answers(&backend),
        "LOG\tError handling line: AXFR requests not supported\nFAIL\n"
    );
}

#[rstest]
fn unknown_commands_are_rejected() {
    let mut backend = negotiated(ProtocolVersion::V3, "GOGOGO\n");
    backend.run(empty_dispatch).expect("run");
    assert_eq!(
        answers(&backend),
        "LOG\tError handling line: bad command: GOGOGO\nFAIL\n"
    );
}

#[rstest]
fn session_survives_per_request_errors() {
    let requests = format!(
        "AXFR\nGOGOGO\n{}PING\n",
        fake_query_line(ProtocolVersion::V2)
    );
    let mut backend = negotiated(ProtocolVersion::V2, &requests);
    let mut calls = 0_u32;

    backend
        .run(|_| {
            calls += 1;
            Err(HandlerError::new("no such zone"))
        })
        .expect("run");

    assert_eq!(calls, 1);
    assert_eq!(
        answers(&backend),
        concat!(
            "LOG\tError handling line: AXFR requests not supported\nFAIL\n",
            "LOG\tError handling line: bad command: GOGOGO\nFAIL\n",
            "LOG\tError handling line: no such zone\nFAIL\n",
            "END\n",
        )
    );
}
