// Frame header shape recognition.
//
// A pure predicate over the first bytes of a network frame, used by callers
// to decide whether a frame's header prefix is worth feeding through the
// encoder's structural fast path. The codec itself never calls this.
//
// Recognizes Ethernet II framing around IPv4/IPv6 with TCP/UDP, restricted
// to the fixed-size layouts: IPv4 IHL = 5 and TCP data offset = 5 (no
// options). Anything else is reported as not compressible.

/// Ethernet II + IPv4 + TCP header length.
pub const ETHERNET_IPV4_TCP: usize = 14 + 20 + 20;

/// Ethernet II + IPv4 + UDP header length.
pub const ETHERNET_IPV4_UDP: usize = 14 + 20 + 8;

/// Ethernet II + IPv6 + TCP header length.
pub const ETHERNET_IPV6_TCP: usize = 14 + 40 + 20;

/// Ethernet II + IPv6 + UDP header length.
pub const ETHERNET_IPV6_UDP: usize = 14 + 40 + 8;

const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_IPV6: u16 = 0x86DD;
const IP_PROTO_TCP: u8 = 0x06;
const IP_PROTO_UDP: u8 = 0x11;

/// Length of the compressible header prefix of `frame`, if the frame is
/// well-formed Ethernet II + IPv4/IPv6 + TCP/UDP with fixed-size headers.
///
/// Returns one of [`ETHERNET_IPV4_TCP`], [`ETHERNET_IPV4_UDP`],
/// [`ETHERNET_IPV6_TCP`], [`ETHERNET_IPV6_UDP`], or `None` when the frame
/// does not match any recognized shape.
pub fn compressible_prefix(frame: &[u8]) -> Option<usize> {
    if frame.len() < ETHERNET_IPV4_UDP {
        return None;
    }
    match u16::from_be_bytes([frame[12], frame[13]]) {
        ETHERTYPE_IPV4 => {
            // version 4, 20-byte header
            if frame[14] != 0x45 {
                return None;
            }
            match frame[23] {
                IP_PROTO_TCP => {
                    if frame.len() < ETHERNET_IPV4_TCP {
                        return None;
                    }
                    // TCP data offset must be 5 (20-byte header)
                    if frame[46] >> 4 != 0x05 {
                        return None;
                    }
                    Some(ETHERNET_IPV4_TCP)
                }
                IP_PROTO_UDP => Some(ETHERNET_IPV4_UDP),
                _ => None,
            }
        }
        ETHERTYPE_IPV6 => match frame[20] {
            IP_PROTO_TCP => {
                if frame.len() < ETHERNET_IPV6_TCP {
                    return None;
                }
                if frame[66] >> 4 != 0x05 {
                    return None;
                }
                Some(ETHERNET_IPV6_TCP)
            }
            IP_PROTO_UDP => {
                if frame.len() < ETHERNET_IPV6_UDP {
                    return None;
                }
                Some(ETHERNET_IPV6_UDP)
            }
            _ => None,
        },
        _ => None,
    }
}
