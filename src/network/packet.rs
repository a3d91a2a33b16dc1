//! IP and TCP header parsing.
//!
//! Produces a transient, bounds-checked view over one raw IP packet: enough
//! header geometry for the rewrite engine to find the TCP payload and for
//! the checksum to be recomputed. Anything malformed or outside the shapes
//! this daemon handles parses to `None`, which callers treat as "leave the
//! packet alone" rather than as an error.

pub const IPPROTO_TCP: u8 = 6;

/// The conventional unencrypted web port.
pub const HTTP_PORT: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

/// Parsed geometry of one TCP segment inside a raw IP packet.
#[derive(Debug, Clone, Copy)]
pub struct TcpView {
    pub version: IpVersion,
    /// Length of the network header in bytes.
    pub ip_header_len: usize,
    /// Offset of the TCP payload from the start of the packet.
    pub payload_offset: usize,
    pub dst_port: u16,
}

impl TcpView {
    /// Parses `data` as an IP packet carrying TCP. Returns `None` for
    /// non-TCP protocols, fragments, and any header that does not fit the
    /// bytes actually present.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let first = *data.first()?;
        match first >> 4 {
            4 => Self::parse_v4(data),
            6 => Self::parse_v6(data),
            _ => None,
        }
    }

    fn parse_v4(data: &[u8]) -> Option<Self> {
        if data.len() < 20 {
            return None;
        }

        let ip_header_len = ((data[0] & 0x0f) as usize) * 4;
        if ip_header_len < 20 || data.len() < ip_header_len {
            return None;
        }

        // A non-first fragment has no TCP header, and rewriting any
        // fragment would leave the segment checksum unverifiable.
        let flags_frag = u16::from_be_bytes([data[6], data[7]]);
        if flags_frag & 0x3fff != 0 {
            return None;
        }

        if data[9] != IPPROTO_TCP {
            return None;
        }

        Self::parse_tcp(data, IpVersion::V4, ip_header_len)
    }

    fn parse_v6(data: &[u8]) -> Option<Self> {
        if data.len() < 40 {
            return None;
        }

        // Only a plain TCP next-header; extension-header chains are left
        // untouched.
        if data[6] != IPPROTO_TCP {
            return None;
        }

        Self::parse_tcp(data, IpVersion::V6, 40)
    }

    fn parse_tcp(data: &[u8], version: IpVersion, ip_header_len: usize) -> Option<Self> {
        if data.len() < ip_header_len + 20 {
            return None;
        }

        let tcp_header_len = ((data[ip_header_len + 12] >> 4) as usize) * 4;
        if tcp_header_len < 20 {
            return None;
        }

        let payload_offset = ip_header_len + tcp_header_len;
        if data.len() < payload_offset {
            return None;
        }

        let dst_port = u16::from_be_bytes([data[ip_header_len + 2], data[ip_header_len + 3]]);

        Some(Self {
            version,
            ip_header_len,
            payload_offset,
            dst_port,
        })
    }

    /// The TCP payload of the packet this view was parsed from.
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.payload_offset..]
    }

    /// Mutable TCP payload, for in-place rewriting.
    pub fn payload_mut<'a>(&self, data: &'a mut [u8]) -> &'a mut [u8] {
        &mut data[self.payload_offset..]
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::network::checksum;

    /// Builds a minimal IPv4/TCP packet to `dst_port` carrying `payload`,
    /// with a correct TCP checksum.
    pub(crate) fn tcp4_packet(dst_port: u16, payload: &[u8]) -> Vec<u8> {
        let total_len = 20 + 20 + payload.len();
        let mut data = vec![0u8; total_len];

        data[0] = 0x45; // IPv4, IHL=5
        data[2..4].copy_from_slice(&(total_len as u16).to_be_bytes());
        data[8] = 64; // TTL
        data[9] = IPPROTO_TCP;
        data[12..16].copy_from_slice(&[192, 168, 1, 2]);
        data[16..20].copy_from_slice(&[93, 184, 216, 34]);

        data[20..22].copy_from_slice(&49152u16.to_be_bytes());
        data[22..24].copy_from_slice(&dst_port.to_be_bytes());
        data[32] = 5 << 4; // data offset = 20 bytes
        data[33] = 0x18; // PSH | ACK

        data[40..].copy_from_slice(payload);

        let view = TcpView::parse(&data).expect("test packet must parse");
        checksum::update_tcp_checksum(&mut data, &view);
        data
    }

    /// Builds a minimal IPv6/TCP packet to `dst_port` carrying `payload`,
    /// with a correct TCP checksum.
    pub(crate) fn tcp6_packet(dst_port: u16, payload: &[u8]) -> Vec<u8> {
        let total_len = 40 + 20 + payload.len();
        let mut data = vec![0u8; total_len];

        data[0] = 0x60; // IPv6
        data[4..6].copy_from_slice(&((20 + payload.len()) as u16).to_be_bytes());
        data[6] = IPPROTO_TCP;
        data[7] = 64; // hop limit
        data[8..24].copy_from_slice(&[
            0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
        ]);
        data[24..40].copy_from_slice(&[
            0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02,
        ]);

        data[40..42].copy_from_slice(&49152u16.to_be_bytes());
        data[42..44].copy_from_slice(&dst_port.to_be_bytes());
        data[52] = 5 << 4;
        data[53] = 0x18;

        data[60..].copy_from_slice(payload);

        let view = TcpView::parse(&data).expect("test packet must parse");
        checksum::update_tcp_checksum(&mut data, &view);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::{tcp4_packet, tcp6_packet};
    use super::*;

    #[test]
    fn test_parse_ipv4_tcp() {
        let data = tcp4_packet(80, b"GET / HTTP/1.1\r\n\r\n");
        let view = TcpView::parse(&data).unwrap();
        assert_eq!(view.version, IpVersion::V4);
        assert_eq!(view.ip_header_len, 20);
        assert_eq!(view.payload_offset, 40);
        assert_eq!(view.dst_port, 80);
        assert_eq!(view.payload(&data), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_parse_ipv6_tcp() {
        let data = tcp6_packet(80, b"GET / HTTP/1.1\r\n\r\n");
        let view = TcpView::parse(&data).unwrap();
        assert_eq!(view.version, IpVersion::V6);
        assert_eq!(view.ip_header_len, 40);
        assert_eq!(view.payload_offset, 60);
        assert_eq!(view.dst_port, 80);
    }

    #[test]
    fn test_rejects_non_tcp() {
        let mut data = tcp4_packet(80, b"x");
        data[9] = 17; // UDP
        assert!(TcpView::parse(&data).is_none());
    }

    #[test]
    fn test_rejects_fragments() {
        let mut data = tcp4_packet(80, b"x");
        data[6] = 0x20; // more-fragments set
        assert!(TcpView::parse(&data).is_none());

        let mut data = tcp4_packet(80, b"x");
        data[7] = 0x10; // non-zero fragment offset
        assert!(TcpView::parse(&data).is_none());
    }

    #[test]
    fn test_rejects_truncated_headers() {
        assert!(TcpView::parse(&[]).is_none());
        assert!(TcpView::parse(&[0x45; 10]).is_none());

        // IHL pointing past the packet.
        let mut data = tcp4_packet(80, b"x");
        data[0] = 0x4f; // IHL=15 -> 60-byte header
        data.truncate(44);
        assert!(TcpView::parse(&data).is_none());
    }

    #[test]
    fn test_rejects_bad_data_offset() {
        let mut data = tcp4_packet(80, b"x");
        data[32] = 0x30; // data offset 12 bytes, below the TCP minimum
        assert!(TcpView::parse(&data).is_none());

        let mut data = tcp4_packet(80, b"");
        data[32] = 0xf0; // data offset 60 bytes, past the packet end
        assert!(TcpView::parse(&data).is_none());
    }
}
