//! Line assembly shared by the record encoders.

use crate::errors::CodecError;

/// Joins `fields` behind `tag` with tabs and terminates the line.
///
/// Fields are written verbatim; a tab or line break inside one would change
/// the record's field count on the wire, so those are refused.
pub(super) fn join_record(tag: &str, fields: &[(&'static str, &str)]) -> Result<String, CodecError> {
    let capacity = tag.len() + fields.iter().map(|(_, value)| value.len() + 1).sum::<usize>() + 1;
    let mut line = String::with_capacity(capacity);
    line.push_str(tag);
    for (name, value) in fields {
        if value.contains(['\t', '\n', '\r']) {
            return Err(CodecError::EmbeddedDelimiter { field: *name });
        }
        line.push('\t');
        line.push_str(value);
    }
    line.push('\n');
    Ok(line)
}
