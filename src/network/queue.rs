//! NFQUEUE transport over a raw netlink socket.
//!
//! This module owns the session with the kernel packet queue: binding the
//! queue, receiving batches of queued packets into a reusable buffer,
//! splitting the batch into individual packets, and returning verdicts.
//! It speaks the nfnetlink_queue wire protocol directly over an
//! `AF_NETLINK` socket rather than going through libnetfilter_queue.

use log::{debug, info};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::ops::Range;
use std::os::unix::io::AsRawFd;
use thiserror::Error;

const NETLINK_NETFILTER: i32 = 12;
const NFNL_SUBSYS_QUEUE: u16 = 3;

// nfnetlink_queue message types
const NFQNL_MSG_PACKET: u16 = 0;
const NFQNL_MSG_VERDICT: u16 = 1;
const NFQNL_MSG_CONFIG: u16 = 2;

/// Full type field of a queued-packet message.
const NFQUEUE_PACKET_TYPE: u16 = (NFNL_SUBSYS_QUEUE << 8) | NFQNL_MSG_PACKET;

// nfqnl_msg_config_cmd commands
const NFQNL_CFG_CMD_BIND: u8 = 1;
const NFQNL_CFG_CMD_UNBIND: u8 = 2;
const NFQNL_CFG_CMD_PF_BIND: u8 = 3;
const NFQNL_CFG_CMD_PF_UNBIND: u8 = 4;

/// Copy mode: deliver packet contents to user space.
const NFQNL_COPY_PACKET: u8 = 2;

// Attributes of packet and verdict messages
const NFQA_PACKET_HDR: u16 = 1;
const NFQA_VERDICT_HDR: u16 = 2;
const NFQA_PAYLOAD: u16 = 10;

// Attributes of config messages
const NFQA_CFG_CMD: u16 = 1;
const NFQA_CFG_PARAMS: u16 = 2;
const NFQA_CFG_MASK: u16 = 4;
const NFQA_CFG_FLAGS: u16 = 5;

/// Queue flag requesting conntrack info alongside each packet.
const NFQA_CFG_F_CONNTRACK: u32 = 1 << 1;

// Netlink framing
const NLMSG_HDRLEN: usize = 16;
const NLMSG_NOOP: u16 = 1;
const NLMSG_ERROR: u16 = 2;
const NLMSG_DONE: u16 = 3;
const NLM_F_REQUEST: u16 = 1;
const NLM_F_ACK: u16 = 4;

/// Mask stripping the NLA_F_NESTED / NLA_F_NET_BYTEORDER bits.
const NLA_TYPE_MASK: u16 = 0x3fff;

const NF_ACCEPT: u32 = 1;

/// Copy range requested from the kernel: whole packets.
const COPY_RANGE: u32 = 0xffff;

/// Receive buffer capacity: one full-size packet copy plus netlink framing,
/// with room for the kernel to batch smaller messages behind it.
const RECV_BUFFER_CAPACITY: usize = 0x20000;

#[derive(Debug, Error)]
pub enum QueueError {
    /// The netlink socket itself failed
    #[error("netlink socket error: {0}")]
    Socket(#[source] io::Error),

    /// The kernel NACKed a queue configuration request
    #[error("kernel refused queue request: {0}")]
    Refused(#[source] io::Error),

    /// The kernel sent framing this module cannot make sense of
    #[error("malformed netlink message from kernel")]
    Malformed,
}

/// Outcome of a transport operation. Explicit variants instead of the
/// numeric status sentinels the wire layer deals in.
#[derive(Debug)]
pub enum IoStatus<T> {
    /// Data is available.
    Ready(T),
    /// Nothing left: the buffer is exhausted, or a blocking call was
    /// interrupted by signal delivery before any data arrived.
    End,
    /// The transport failed.
    Error(QueueError),
}

/// Verdict returned to the kernel for one queued packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketVerdict<'a> {
    /// Accept the packet exactly as received; no payload travels back.
    Accept,
    /// Accept the packet with the edited bytes attached.
    AcceptModified(&'a [u8]),
}

/// Transient view over one queued packet: the kernel-assigned correlation
/// id plus the span of the raw IP packet inside the receive buffer. Never
/// outlives the dispatch call that consumes it.
#[derive(Debug, Clone)]
pub struct NfPacket {
    pub packet_id: u32,
    bytes: Range<usize>,
}

/// Reusable receive buffer. The backing storage is allocated on the first
/// receive and its capacity never changes afterwards; a cursor tracks the
/// split into individual packet messages.
#[derive(Debug, Default)]
pub struct NfBuffer {
    data: Vec<u8>,
    len: usize,
    pos: usize,
}

impl NfBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backing storage for the next receive, allocating it on first use.
    pub fn prepare(&mut self) -> &mut [u8] {
        if self.data.is_empty() {
            self.data = vec![0u8; RECV_BUFFER_CAPACITY];
        }
        self.len = 0;
        self.pos = 0;
        &mut self.data
    }

    /// Marks `len` bytes of the prepared storage as received.
    pub fn commit(&mut self, len: usize) {
        debug_assert!(len <= self.data.len());
        self.len = len;
        self.pos = 0;
    }

    /// Pops the next queued packet out of the received datagram.
    ///
    /// Walks the netlink messages in order, skipping control traffic,
    /// yielding `Ready` per packet message and `End` once the datagram is
    /// exhausted. Broken framing surfaces as `Error` so the caller can run
    /// its recovery protocol.
    pub fn next(&mut self) -> IoStatus<NfPacket> {
        while self.pos + NLMSG_HDRLEN <= self.len {
            let base = self.pos;
            let msg_len = u32::from_ne_bytes([
                self.data[base],
                self.data[base + 1],
                self.data[base + 2],
                self.data[base + 3],
            ]) as usize;
            let msg_type = u16::from_ne_bytes([self.data[base + 4], self.data[base + 5]]);

            if msg_len < NLMSG_HDRLEN || base + msg_len > self.len {
                return IoStatus::Error(QueueError::Malformed);
            }
            self.pos = base + align4(msg_len);

            match msg_type {
                NLMSG_NOOP | NLMSG_DONE => continue,
                NLMSG_ERROR => {
                    if msg_len < NLMSG_HDRLEN + 4 {
                        return IoStatus::Error(QueueError::Malformed);
                    }
                    let errno = i32::from_ne_bytes([
                        self.data[base + 16],
                        self.data[base + 17],
                        self.data[base + 18],
                        self.data[base + 19],
                    ]);
                    if errno == 0 {
                        // Stray ACK, nothing to act on.
                        continue;
                    }
                    return IoStatus::Error(QueueError::Refused(io::Error::from_raw_os_error(
                        -errno,
                    )));
                }
                NFQUEUE_PACKET_TYPE => {
                    match parse_packet_message(&self.data[base..base + msg_len]) {
                        Some(mut packet) => {
                            packet.bytes = packet.bytes.start + base..packet.bytes.end + base;
                            return IoStatus::Ready(packet);
                        }
                        None => return IoStatus::Error(QueueError::Malformed),
                    }
                }
                _ => continue,
            }
        }

        IoStatus::End
    }

    /// The raw IP packet bytes of a previously split packet.
    pub fn packet_bytes(&self, packet: &NfPacket) -> &[u8] {
        &self.data[packet.bytes.clone()]
    }

    /// Mutable view of the raw IP packet bytes, for in-place rewriting.
    pub fn packet_bytes_mut(&mut self, packet: &NfPacket) -> &mut [u8] {
        &mut self.data[packet.bytes.clone()]
    }
}

/// Extracts the correlation id and payload span from one packet message.
/// The span is relative to the message start; the caller rebases it onto
/// the buffer. Returns `None` when the mandatory packet header attribute
/// is missing, since a packet without an id can never receive a verdict.
fn parse_packet_message(msg: &[u8]) -> Option<NfPacket> {
    // Skip nlmsghdr and nfgenmsg.
    let mut pos = NLMSG_HDRLEN + 4;
    let mut packet_id = None;
    let mut bytes = 0..0;

    while pos + 4 <= msg.len() {
        let attr_len = u16::from_ne_bytes([msg[pos], msg[pos + 1]]) as usize;
        let attr_type = u16::from_ne_bytes([msg[pos + 2], msg[pos + 3]]) & NLA_TYPE_MASK;
        if attr_len < 4 || pos + attr_len > msg.len() {
            return None;
        }
        let data_start = pos + 4;
        let data_end = pos + attr_len;

        match attr_type {
            NFQA_PACKET_HDR if attr_len >= 4 + 4 => {
                packet_id = Some(u32::from_be_bytes([
                    msg[data_start],
                    msg[data_start + 1],
                    msg[data_start + 2],
                    msg[data_start + 3],
                ]));
            }
            NFQA_PAYLOAD => {
                bytes = data_start..data_end;
            }
            _ => {}
        }

        pos += align4(attr_len);
    }

    packet_id.map(|packet_id| NfPacket { packet_id, bytes })
}

/// Seam between the acquisition loop and the kernel queue, so the loop and
/// its recovery protocol can be exercised against an in-memory transport.
pub trait Transport {
    /// Blocks until the kernel delivers a batch of queued packets.
    fn receive(&mut self, buffer: &mut NfBuffer) -> IoStatus<()>;

    /// Returns the verdict for one packet, keyed by its correlation id.
    fn verdict(&mut self, packet_id: u32, verdict: PacketVerdict<'_>) -> Result<(), QueueError>;

    /// Closes the current queue session and opens a fresh one bound to the
    /// same queue number with connection tracking disabled.
    fn reopen_without_conntrack(&mut self) -> Result<(), QueueError>;
}

/// An open NFQUEUE session. Exclusively owned by the acquisition loop for
/// the lifetime of a process run.
pub struct NfQueue {
    socket: Socket,
    queue_num: u16,
    conntrack_disabled: bool,
    seq: u32,
    closed: bool,
}

impl NfQueue {
    /// Opens a session bound to `queue_num`.
    ///
    /// Unless `disable_conntrack` is set, the queue is configured to attach
    /// conntrack info to delivered packets. The recovery protocol reopens
    /// without it: on some kernels the conntrack interaction starves the
    /// queue, and dropping the flag is the documented workaround.
    pub fn open(queue_num: u16, disable_conntrack: bool) -> Result<Self, QueueError> {
        let socket = Socket::new(
            Domain::from(libc::AF_NETLINK),
            Type::RAW,
            Some(Protocol::from(NETLINK_NETFILTER)),
        )
        .map_err(QueueError::Socket)?;

        unsafe {
            let mut addr: libc::sockaddr_nl = std::mem::zeroed();
            addr.nl_family = libc::AF_NETLINK as u16;
            if libc::bind(
                socket.as_raw_fd(),
                &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            ) < 0
            {
                return Err(QueueError::Socket(io::Error::last_os_error()));
            }
        }

        // Best effort; the kernel clamps to rmem_max anyway.
        let _ = socket.set_recv_buffer_size(1024 * 1024);

        let mut queue = Self {
            socket,
            queue_num,
            conntrack_disabled: disable_conntrack,
            seq: 0,
            closed: false,
        };

        // Rebind the protocol family, then the queue itself.
        queue.send_config_cmd(NFQNL_CFG_CMD_PF_UNBIND, libc::AF_INET as u16)?;
        queue.send_config_cmd(NFQNL_CFG_CMD_PF_BIND, libc::AF_INET as u16)?;
        queue.send_config_cmd(NFQNL_CFG_CMD_BIND, 0)?;
        queue.send_config_params()?;
        if !disable_conntrack {
            queue.send_config_flags(NFQA_CFG_F_CONNTRACK)?;
        }

        info!(
            "bound to nfqueue {queue_num} (conntrack {})",
            if disable_conntrack { "disabled" } else { "enabled" }
        );
        Ok(queue)
    }

    pub fn queue_num(&self) -> u16 {
        self.queue_num
    }

    pub fn conntrack_disabled(&self) -> bool {
        self.conntrack_disabled
    }

    /// Unbinds the queue. Safe to call more than once; failures are only
    /// logged because close runs on teardown paths.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.send_config_cmd(NFQNL_CFG_CMD_UNBIND, 0) {
            debug!("queue unbind failed during close: {e}");
        }
    }

    fn send_config_cmd(&mut self, command: u8, pf: u16) -> Result<(), QueueError> {
        // struct nfqnl_msg_config_cmd: command, pad, pf (big-endian)
        let pf_be = pf.to_be_bytes();
        let cmd_attr = build_nlattr(NFQA_CFG_CMD, &[command, 0, pf_be[0], pf_be[1]]);

        let pf_command = matches!(command, NFQNL_CFG_CMD_PF_BIND | NFQNL_CFG_CMD_PF_UNBIND);
        let family = if pf_command {
            pf as u8
        } else {
            libc::AF_UNSPEC as u8
        };
        let res_id = if pf_command { 0 } else { self.queue_num };

        self.send_config(family, res_id, &cmd_attr)
    }

    fn send_config_params(&mut self) -> Result<(), QueueError> {
        // struct nfqnl_msg_config_params: copy_range (big-endian), copy_mode
        let mut params = Vec::with_capacity(8);
        params.extend_from_slice(&COPY_RANGE.to_be_bytes());
        params.push(NFQNL_COPY_PACKET);
        params.extend_from_slice(&[0, 0, 0]);

        let attr = build_nlattr(NFQA_CFG_PARAMS, &params);
        self.send_config(libc::AF_UNSPEC as u8, self.queue_num, &attr)
    }

    fn send_config_flags(&mut self, flags: u32) -> Result<(), QueueError> {
        let mut attrs = build_nlattr(NFQA_CFG_FLAGS, &flags.to_be_bytes());
        attrs.extend_from_slice(&build_nlattr(NFQA_CFG_MASK, &flags.to_be_bytes()));
        self.send_config(libc::AF_UNSPEC as u8, self.queue_num, &attrs)
    }

    fn send_config(&mut self, family: u8, res_id: u16, attrs: &[u8]) -> Result<(), QueueError> {
        self.seq = self.seq.wrapping_add(1);
        let msg_type = (NFNL_SUBSYS_QUEUE << 8) | NFQNL_MSG_CONFIG;
        let msg = build_message(
            msg_type,
            NLM_F_REQUEST | NLM_F_ACK,
            self.seq,
            family,
            res_id,
            attrs,
        );
        self.send(&msg)?;
        self.recv_ack()
    }

    fn send(&self, msg: &[u8]) -> Result<(), QueueError> {
        unsafe {
            let mut addr: libc::sockaddr_nl = std::mem::zeroed();
            addr.nl_family = libc::AF_NETLINK as u16;
            let sent = libc::sendto(
                self.socket.as_raw_fd(),
                msg.as_ptr() as *const libc::c_void,
                msg.len(),
                0,
                &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            );
            if sent < 0 {
                return Err(QueueError::Socket(io::Error::last_os_error()));
            }
        }
        Ok(())
    }

    /// Reads the kernel's reply to a config request and surfaces a NACK.
    fn recv_ack(&mut self) -> Result<(), QueueError> {
        let mut buf = [0u8; 1024];
        let received = unsafe {
            libc::recv(
                self.socket.as_raw_fd(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                0,
            )
        };
        if received < 0 {
            return Err(QueueError::Socket(io::Error::last_os_error()));
        }

        if received as usize >= NLMSG_HDRLEN + 4 {
            let msg_type = u16::from_ne_bytes([buf[4], buf[5]]);
            if msg_type == NLMSG_ERROR {
                let errno = i32::from_ne_bytes([buf[16], buf[17], buf[18], buf[19]]);
                if errno != 0 {
                    return Err(QueueError::Refused(io::Error::from_raw_os_error(-errno)));
                }
            }
        }

        Ok(())
    }
}

impl Transport for NfQueue {
    fn receive(&mut self, buffer: &mut NfBuffer) -> IoStatus<()> {
        let storage = buffer.prepare();
        let received = unsafe {
            libc::recv(
                self.socket.as_raw_fd(),
                storage.as_mut_ptr() as *mut libc::c_void,
                storage.len(),
                0,
            )
        };
        if received < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                // Signal delivery; the loop re-checks the shutdown flag.
                return IoStatus::End;
            }
            return IoStatus::Error(QueueError::Socket(err));
        }

        buffer.commit(received as usize);
        IoStatus::Ready(())
    }

    fn verdict(&mut self, packet_id: u32, verdict: PacketVerdict<'_>) -> Result<(), QueueError> {
        self.seq = self.seq.wrapping_add(1);
        let msg = build_verdict_message(self.seq, self.queue_num, packet_id, verdict);
        self.send(&msg)
    }

    fn reopen_without_conntrack(&mut self) -> Result<(), QueueError> {
        self.close();
        *self = Self::open(self.queue_num, true)?;
        Ok(())
    }
}

impl Drop for NfQueue {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builds a complete netlink message: nlmsghdr, nfgenmsg, attributes.
fn build_message(
    msg_type: u16,
    flags: u16,
    seq: u32,
    family: u8,
    res_id: u16,
    attrs: &[u8],
) -> Vec<u8> {
    let total_len = NLMSG_HDRLEN + 4 + attrs.len();
    let mut msg = Vec::with_capacity(total_len);
    msg.extend_from_slice(&(total_len as u32).to_ne_bytes());
    msg.extend_from_slice(&msg_type.to_ne_bytes());
    msg.extend_from_slice(&flags.to_ne_bytes());
    msg.extend_from_slice(&seq.to_ne_bytes());
    msg.extend_from_slice(&0u32.to_ne_bytes()); // pid: kernel
    msg.push(family);
    msg.push(0); // NFNETLINK_V0
    msg.extend_from_slice(&res_id.to_be_bytes());
    msg.extend_from_slice(attrs);
    msg
}

/// Builds one netlink attribute, padded to 4-byte alignment.
fn build_nlattr(attr_type: u16, data: &[u8]) -> Vec<u8> {
    let len = 4 + data.len();
    let mut attr = Vec::with_capacity(align4(len));
    attr.extend_from_slice(&(len as u16).to_ne_bytes());
    attr.extend_from_slice(&attr_type.to_ne_bytes());
    attr.extend_from_slice(data);
    attr.resize(align4(len), 0);
    attr
}

fn build_verdict_message(
    seq: u32,
    queue_num: u16,
    packet_id: u32,
    verdict: PacketVerdict<'_>,
) -> Vec<u8> {
    // struct nfqnl_msg_verdict_hdr: verdict, packet id (both big-endian)
    let mut verdict_hdr = Vec::with_capacity(8);
    verdict_hdr.extend_from_slice(&NF_ACCEPT.to_be_bytes());
    verdict_hdr.extend_from_slice(&packet_id.to_be_bytes());

    let mut attrs = build_nlattr(NFQA_VERDICT_HDR, &verdict_hdr);
    if let PacketVerdict::AcceptModified(bytes) = verdict {
        attrs.extend_from_slice(&build_nlattr(NFQA_PAYLOAD, bytes));
    }

    let msg_type = (NFNL_SUBSYS_QUEUE << 8) | NFQNL_MSG_VERDICT;
    build_message(
        msg_type,
        NLM_F_REQUEST,
        seq,
        libc::AF_UNSPEC as u8,
        queue_num,
        &attrs,
    )
}

fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// Encodes a queued-packet message the way the kernel would, for tests of
/// the splitting and dispatch paths.
#[cfg(test)]
pub(crate) fn encode_packet_message(packet_id: u32, payload: &[u8]) -> Vec<u8> {
    // struct nfqnl_msg_packet_hdr: packet id, hw protocol, hook
    let mut hdr = Vec::with_capacity(7);
    hdr.extend_from_slice(&packet_id.to_be_bytes());
    hdr.extend_from_slice(&0x0800u16.to_be_bytes());
    hdr.push(0);

    let mut attrs = build_nlattr(NFQA_PACKET_HDR, &hdr);
    attrs.extend_from_slice(&build_nlattr(NFQA_PAYLOAD, payload));

    build_message(NFQUEUE_PACKET_TYPE, 0, 0, libc::AF_UNSPEC as u8, 1, &attrs)
}

/// Fills a buffer with a received datagram, as tests stand in for the
/// kernel socket.
#[cfg(test)]
pub(crate) fn fill_buffer(buffer: &mut NfBuffer, datagram: &[u8]) {
    let storage = buffer.prepare();
    storage[..datagram.len()].copy_from_slice(datagram);
    buffer.commit(datagram.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_yields_each_packet_then_end() {
        let mut datagram = encode_packet_message(7, b"first");
        datagram.extend_from_slice(&encode_packet_message(8, b"second"));

        let mut buffer = NfBuffer::new();
        fill_buffer(&mut buffer, &datagram);

        let first = match buffer.next() {
            IoStatus::Ready(packet) => packet,
            other => panic!("expected first packet, got {other:?}"),
        };
        assert_eq!(first.packet_id, 7);
        assert_eq!(buffer.packet_bytes(&first), b"first");

        let second = match buffer.next() {
            IoStatus::Ready(packet) => packet,
            other => panic!("expected second packet, got {other:?}"),
        };
        assert_eq!(second.packet_id, 8);
        assert_eq!(buffer.packet_bytes(&second), b"second");

        assert!(matches!(buffer.next(), IoStatus::End));
    }

    #[test]
    fn test_split_skips_control_messages() {
        // NLMSG_NOOP, then a real packet, then NLMSG_DONE.
        let mut datagram = build_message(NLMSG_NOOP, 0, 0, 0, 0, &[]);
        datagram.extend_from_slice(&encode_packet_message(3, b"payload"));
        datagram.extend_from_slice(&build_message(NLMSG_DONE, 0, 0, 0, 0, &[]));

        let mut buffer = NfBuffer::new();
        fill_buffer(&mut buffer, &datagram);

        match buffer.next() {
            IoStatus::Ready(packet) => assert_eq!(packet.packet_id, 3),
            other => panic!("expected packet, got {other:?}"),
        }
        assert!(matches!(buffer.next(), IoStatus::End));
    }

    #[test]
    fn test_truncated_message_is_malformed() {
        let datagram = encode_packet_message(1, b"payload");

        let mut buffer = NfBuffer::new();
        // Chop the datagram short of its declared length.
        fill_buffer(&mut buffer, &datagram[..datagram.len() - 4]);

        assert!(matches!(
            buffer.next(),
            IoStatus::Error(QueueError::Malformed)
        ));
    }

    #[test]
    fn test_kernel_error_message_surfaces() {
        // NLMSG_ERROR carrying -ENOBUFS.
        let errno = (-libc::ENOBUFS).to_ne_bytes();
        let mut payload = Vec::new();
        payload.extend_from_slice(&errno);
        let mut datagram = Vec::new();
        let total_len = (NLMSG_HDRLEN + payload.len()) as u32;
        datagram.extend_from_slice(&total_len.to_ne_bytes());
        datagram.extend_from_slice(&NLMSG_ERROR.to_ne_bytes());
        datagram.extend_from_slice(&0u16.to_ne_bytes());
        datagram.extend_from_slice(&0u32.to_ne_bytes());
        datagram.extend_from_slice(&0u32.to_ne_bytes());
        datagram.extend_from_slice(&payload);

        let mut buffer = NfBuffer::new();
        fill_buffer(&mut buffer, &datagram);

        assert!(matches!(
            buffer.next(),
            IoStatus::Error(QueueError::Refused(_))
        ));
    }

    #[test]
    fn test_packet_without_id_is_malformed() {
        // A packet message carrying only a payload attribute.
        let attrs = build_nlattr(NFQA_PAYLOAD, b"orphan");
        let datagram = build_message(NFQUEUE_PACKET_TYPE, 0, 0, 0, 1, &attrs);

        let mut buffer = NfBuffer::new();
        fill_buffer(&mut buffer, &datagram);

        assert!(matches!(
            buffer.next(),
            IoStatus::Error(QueueError::Malformed)
        ));
    }

    #[test]
    fn test_nlattr_padding() {
        let attr = build_nlattr(NFQA_PAYLOAD, b"abcde");
        // 4-byte header + 5 data bytes, padded to 12.
        assert_eq!(attr.len(), 12);
        assert_eq!(u16::from_ne_bytes([attr[0], attr[1]]), 9);
        assert_eq!(&attr[4..9], b"abcde");
        assert_eq!(&attr[9..], &[0, 0, 0]);
    }

    fn attr_types(msg: &[u8]) -> Vec<u16> {
        let mut pos = NLMSG_HDRLEN + 4;
        let mut types = Vec::new();
        while pos + 4 <= msg.len() {
            let attr_len = u16::from_ne_bytes([msg[pos], msg[pos + 1]]) as usize;
            types.push(u16::from_ne_bytes([msg[pos + 2], msg[pos + 3]]) & NLA_TYPE_MASK);
            pos += align4(attr_len);
        }
        types
    }

    #[test]
    fn test_verdict_accept_omits_payload() {
        let msg = build_verdict_message(1, 10010, 99, PacketVerdict::Accept);
        assert_eq!(attr_types(&msg), vec![NFQA_VERDICT_HDR]);

        // NF_ACCEPT and the correlation id, both big-endian.
        let data_start = NLMSG_HDRLEN + 4 + 4;
        assert_eq!(
            u32::from_be_bytes(msg[data_start..data_start + 4].try_into().unwrap()),
            NF_ACCEPT
        );
        assert_eq!(
            u32::from_be_bytes(msg[data_start + 4..data_start + 8].try_into().unwrap()),
            99
        );
    }

    #[test]
    fn test_verdict_modified_carries_bytes() {
        let edited = b"edited packet bytes";
        let msg = build_verdict_message(1, 10010, 42, PacketVerdict::AcceptModified(edited));
        assert_eq!(attr_types(&msg), vec![NFQA_VERDICT_HDR, NFQA_PAYLOAD]);

        // The payload attribute holds exactly the edited bytes.
        let verdict_attr_len = align4(4 + 8);
        let payload_attr = NLMSG_HDRLEN + 4 + verdict_attr_len;
        let payload_len =
            u16::from_ne_bytes([msg[payload_attr], msg[payload_attr + 1]]) as usize - 4;
        assert_eq!(payload_len, edited.len());
        assert_eq!(
            &msg[payload_attr + 4..payload_attr + 4 + payload_len],
            edited
        );
    }
}
