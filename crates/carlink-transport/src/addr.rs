use std::fmt;
use std::str::FromStr;

/// Errors that can occur while parsing a device address.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddrParseError {
    /// The address does not have six colon-separated octets.
    #[error("expected 6 colon-separated octets, got {0}")]
    OctetCount(usize),

    /// An octet is not a two-digit hex value.
    #[error("invalid octet {octet:?} at position {position}")]
    InvalidOctet { octet: String, position: usize },
}

/// A 6-byte Bluetooth hardware address.
///
/// Textual form is the usual `XX:XX:XX:XX:XX:XX` (e.g. `00:06:66:49:89:E3`,
/// as printed by `hcitool scan`). Stored in display order; transport
/// implementations are responsible for any wire-order conversion.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceAddr([u8; 6]);

impl DeviceAddr {
    /// Construct from raw octets in display order.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The raw octets in display order.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for DeviceAddr {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(AddrParseError::OctetCount(parts.len()));
        }

        let mut octets = [0u8; 6];
        for (position, part) in parts.iter().enumerate() {
            if part.len() != 2 {
                return Err(AddrParseError::InvalidOctet {
                    octet: (*part).to_string(),
                    position,
                });
            }
            octets[position] =
                u8::from_str_radix(part, 16).map_err(|_| AddrParseError::InvalidOctet {
                    octet: (*part).to_string(),
                    position,
                })?;
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for DeviceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Debug for DeviceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceAddr({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_roundtrip() {
        let addr: DeviceAddr = "00:06:66:49:89:E3".parse().unwrap();
        assert_eq!(addr.octets(), [0x00, 0x06, 0x66, 0x49, 0x89, 0xE3]);
        assert_eq!(addr.to_string(), "00:06:66:49:89:E3");
    }

    #[test]
    fn parse_accepts_lowercase() {
        let addr: DeviceAddr = "00:06:66:61:ac:9e".parse().unwrap();
        assert_eq!(addr.to_string(), "00:06:66:61:AC:9E");
    }

    #[test]
    fn parse_rejects_wrong_octet_count() {
        let err = "00:06:66:49:89".parse::<DeviceAddr>().unwrap_err();
        assert_eq!(err, AddrParseError::OctetCount(5));
    }

    #[test]
    fn parse_rejects_bad_octet() {
        let err = "00:06:66:49:89:ZZ".parse::<DeviceAddr>().unwrap_err();
        assert!(matches!(
            err,
            AddrParseError::InvalidOctet { position: 5, .. }
        ));
    }

    #[test]
    fn parse_rejects_wide_octet() {
        let err = "000:06:66:49:89:E3".parse::<DeviceAddr>().unwrap_err();
        assert!(matches!(
            err,
            AddrParseError::InvalidOctet { position: 0, .. }
        ));
    }
}
