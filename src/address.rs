//! Strict dotted-decimal IPv4 parsing
//!
//! Accepts exactly four components separated by `.`, each made only of ASCII
//! digits with a value of 0-255. Leading zeros are read as decimal
//! (`010` is 10). Whitespace, signs, missing or extra components are all
//! rejected with [`QqwryError::InvalidAddress`].

use crate::error::{QqwryError, Result};
use std::net::Ipv4Addr;

/// Parse a dotted-decimal address into its packed big-endian integer
///
/// ```rust
/// use qqwry::address::parse_ipv4;
///
/// assert_eq!(parse_ipv4("10.0.0.5").unwrap(), 0x0a00_0005);
/// assert!(parse_ipv4("10.0.5").is_err());
/// ```
pub fn parse_ipv4(input: &str) -> Result<u32> {
    let mut octets = [0u8; 4];
    let mut count = 0;

    for part in input.split('.') {
        if count == octets.len() {
            return Err(invalid(input, "more than four components"));
        }
        octets[count] = parse_octet(input, part)?;
        count += 1;
    }

    if count != octets.len() {
        return Err(invalid(input, "expected four components"));
    }

    Ok(pack(octets))
}

/// Parse a dotted-decimal address into an [`Ipv4Addr`]
pub fn parse_ipv4_addr(input: &str) -> Result<Ipv4Addr> {
    parse_ipv4(input).map(Ipv4Addr::from)
}

/// Combine four octets as `o0 << 24 | o1 << 16 | o2 << 8 | o3`
#[inline]
pub const fn pack(octets: [u8; 4]) -> u32 {
    ((octets[0] as u32) << 24)
        | ((octets[1] as u32) << 16)
        | ((octets[2] as u32) << 8)
        | (octets[3] as u32)
}

fn parse_octet(input: &str, part: &str) -> Result<u8> {
    if part.is_empty() {
        return Err(invalid(input, "empty component"));
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(input, "non-numeric component"));
    }

    let value = part
        .bytes()
        .try_fold(0u32, |acc, b| {
            let next = acc * 10 + (b - b'0') as u32;
            (next <= u8::MAX as u32).then_some(next)
        })
        .ok_or_else(|| invalid(input, "component out of range"))?;

    Ok(value as u8)
}

fn invalid(input: &str, reason: &str) -> QqwryError {
    QqwryError::InvalidAddress(format!("'{}': {}", input, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert_eq!(parse_ipv4("0.0.0.0").unwrap(), 0);
        assert_eq!(parse_ipv4("255.255.255.255").unwrap(), u32::MAX);
        assert_eq!(parse_ipv4("1.2.3.4").unwrap(), 0x01020304);
        assert_eq!(parse_ipv4("010.000.000.001").unwrap(), 0x0a000001);
        assert_eq!(
            parse_ipv4_addr("192.168.1.1").unwrap(),
            Ipv4Addr::new(192, 168, 1, 1)
        );
    }

    #[test]
    fn test_pack_matches_std() {
        let addr = Ipv4Addr::new(203, 0, 113, 77);
        assert_eq!(pack(addr.octets()), u32::from(addr));
    }

    #[test]
    fn test_wrong_component_count() {
        for input in ["", "1", "1.2.3", "1.2.3.4.5", "1.2.3.4."] {
            assert!(
                matches!(parse_ipv4(input), Err(QqwryError::InvalidAddress(_))),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_malformed_components() {
        for input in [
            "1..3.4",
            "a.b.c.d",
            "1.2.3.x",
            "+1.2.3.4",
            "-1.2.3.4",
            " 1.2.3.4",
            "1.2.3.4 ",
            "1.2.3.256",
            "1.2.3.99999999999",
            "::1",
        ] {
            assert!(
                matches!(parse_ipv4(input), Err(QqwryError::InvalidAddress(_))),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_error_mentions_input() {
        let err = parse_ipv4("1.2.3").unwrap_err();
        assert!(err.to_string().contains("1.2.3"));
    }
}
