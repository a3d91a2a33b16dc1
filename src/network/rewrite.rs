//! User-Agent rewrite engine.
//!
//! Per-packet, single-pass, length-preserving: locate the `User-Agent:`
//! request header inside the TCP payload, overwrite the value span in
//! place, and recompute the transport checksum. Everything this module
//! cannot make sense of (non-HTTP traffic, a missing header, a value
//! that never terminates inside the packet) degrades to "leave the
//! packet untouched". No error ever escapes from here; legitimate traffic
//! must not be dropped on parse uncertainty.

use crate::network::checksum;
use crate::network::packet::{TcpView, HTTP_PORT};
use crate::stats::Stats;
use log::trace;
use std::ops::Range;

/// Field name matched case-insensitively, per RFC 9110.
const PATTERN: &[u8] = b"User-Agent:";

/// Byte used to pad a replacement shorter than the original value.
const FILLER: u8 = b' ';

/// Inspects one raw IP packet and rewrites its User-Agent value in place.
///
/// Returns `true` when any payload byte changed, in which case the TCP
/// checksum has already been brought back in line with the edited bytes.
/// The packet's total length never changes.
pub fn rewrite_user_agent(data: &mut [u8], replacement: &[u8], stats: &Stats) -> bool {
    stats.count_inspected();

    let Some(view) = TcpView::parse(data) else {
        return false;
    };
    if view.dst_port != HTTP_PORT {
        return false;
    }
    if data.len() <= view.payload_offset {
        // Pure ACK or zero-length segment.
        return false;
    }

    let Some(span) = find_agent_span(view.payload(data)) else {
        return false;
    };
    let span = view.payload_offset + span.start..view.payload_offset + span.end;

    overwrite_span(&mut data[span.clone()], replacement);
    checksum::update_tcp_checksum(data, &view);
    stats.count_rewritten();
    trace!("rewrote User-Agent value ({} bytes)", span.len());

    true
}

/// Locates the value span of a `User-Agent:` header inside `payload`: the
/// range between the single space after the field name and the CRLF that
/// terminates the header line. The scan never leaves the payload; a header
/// split across packets is simply not found.
fn find_agent_span(payload: &[u8]) -> Option<Range<usize>> {
    let start = find_pattern(payload)? + PATTERN.len() + 1;
    let len = find_crlf(&payload[start..])?;
    if len == 0 {
        return None;
    }
    Some(start..start + len)
}

/// Case-insensitive search for the field name followed by one space.
fn find_pattern(payload: &[u8]) -> Option<usize> {
    let window = PATTERN.len() + 1;
    payload
        .windows(window)
        .position(|w| w[PATTERN.len()] == b' ' && w[..PATTERN.len()].eq_ignore_ascii_case(PATTERN))
}

fn find_crlf(payload: &[u8]) -> Option<usize> {
    payload.windows(2).position(|w| w == b"\r\n")
}

/// Writes `replacement` over the span, truncating when longer and padding
/// with filler bytes when shorter, so the span length is exactly preserved.
fn overwrite_span(span: &mut [u8], replacement: &[u8]) {
    let n = replacement.len().min(span.len());
    span[..n].copy_from_slice(&replacement[..n]);
    for byte in &mut span[n..] {
        *byte = FILLER;
    }
}
