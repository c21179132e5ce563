//! Marker recognition for generated ssh config blocks
//!
//! Every generated host block is enclosed in a begin and an end marker line
//! carrying the host id:
//!
//! ```text
//! # <<< BEGIN{6f1c2a0e-8a4b-4d43-9d0c-3c1d5f0e9a11}
//! Host web01
//! 	Hostname web01.example.com
//! # >>> END{6f1c2a0e-8a4b-4d43-9d0c-3c1d5f0e9a11}
//! ```
//!
//! [`partition`] splits a file into the human-authored (foreign) lines and
//! the generated lines with a two-state machine.

use uuid::Uuid;

use super::error::SshConfigError;

const BEGIN_PREFIX: &str = "# <<< BEGIN{";
const END_PREFIX: &str = "# >>> END{";
const MARKER_SUFFIX: &str = "}";

/// A recognised marker line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Begin(String),
    End(String),
}

/// Format the begin marker for a host id
pub fn begin_marker(id: &Uuid) -> String {
    format!("{BEGIN_PREFIX}{id}{MARKER_SUFFIX}")
}

/// Format the end marker for a host id
pub fn end_marker(id: &Uuid) -> String {
    format!("{END_PREFIX}{id}{MARKER_SUFFIX}")
}

/// Recognise a whole-line marker
///
/// The id token may only contain hex digits and `-`.
pub fn parse_marker(line: &str) -> Option<Marker> {
    let token = |prefix: &str| {
        line.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(MARKER_SUFFIX))
            .filter(|id| id.chars().all(|c| c.is_ascii_hexdigit() || c == '-'))
            .map(str::to_string)
    };

    token(BEGIN_PREFIX)
        .map(Marker::Begin)
        .or_else(|| token(END_PREFIX).map(Marker::End))
}

/// The two partitions of an ssh config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    /// Lines outside any marker pair, in original order
    pub foreign: Vec<String>,
    /// Marker pairs and the lines between them, in original order
    pub generated: Vec<String>,
}

enum ScanState {
    Foreign,
    Generated { id: String, opened_at: usize },
}

/// Split lines into foreign and generated partitions
///
/// A begin marker opens a block and an end marker with the same id closes
/// it; both are captured into the generated partition. An end marker
/// outside a block is kept as a foreign line. A begin marker inside an open
/// block, an end marker with a different id, and a block still open at the
/// end of input are reported as [`SshConfigError::Corrupt`].
pub fn partition<I>(lines: I) -> Result<Partitions, SshConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut parts = Partitions::default();
    let mut state = ScanState::Foreign;

    for (index, line) in lines.into_iter().enumerate() {
        let line_no = index + 1;
        let marker = parse_marker(&line);

        state = match (state, marker) {
            (ScanState::Foreign, Some(Marker::Begin(id))) => {
                tracing::debug!("Found start at line {}: {}", line_no, line);
                parts.generated.push(line);
                ScanState::Generated {
                    id,
                    opened_at: line_no,
                }
            }
            (ScanState::Foreign, Some(Marker::End(_))) => {
                tracing::warn!(
                    "End marker without begin at line {}, keeping it: {}",
                    line_no,
                    line
                );
                parts.foreign.push(line);
                ScanState::Foreign
            }
            (ScanState::Foreign, None) => {
                parts.foreign.push(line);
                ScanState::Foreign
            }
            (ScanState::Generated { opened_at, .. }, Some(Marker::Begin(_))) => {
                return Err(SshConfigError::Corrupt {
                    line: line_no,
                    reason: format!("begin marker inside the block opened at line {opened_at}"),
                });
            }
            (ScanState::Generated { id, opened_at }, Some(Marker::End(end_id))) => {
                if !end_id.eq_ignore_ascii_case(&id) {
                    return Err(SshConfigError::Corrupt {
                        line: line_no,
                        reason: format!(
                            "end marker {{{end_id}}} does not close the block {{{id}}} opened at line {opened_at}"
                        ),
                    });
                }
                tracing::debug!("Found end at line {}: {}", line_no, line);
                parts.generated.push(line);
                ScanState::Foreign
            }
            (generated @ ScanState::Generated { .. }, None) => {
                parts.generated.push(line);
                generated
            }
        };
    }

    if let ScanState::Generated { id, opened_at } = state {
        return Err(SshConfigError::Corrupt {
            line: opened_at,
            reason: format!("block {{{id}}} is never closed"),
        });
    }

    tracing::debug!(
        "Found {} generated and {} foreign lines",
        parts.generated.len(),
        parts.foreign.len()
    );
    Ok(parts)
}
