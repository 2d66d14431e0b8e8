use crate::core::ResolverError;
use byteorder::ReadBytesExt;
use std::fmt;
use std::fmt::Display;
use std::io::{Read, Seek, SeekFrom};
use std::str::FromStr;

/// Domain name made up of labels, either read from rdata or parsed from user input.
///
/// Labels are kept as-is without any character restrictions since DNS-SD service
/// instance names may contain spaces, dots, or any other UTF-8 text. When displayed,
/// dots and backslashes within a label are escaped with a backslash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    labels: Vec<String>,
}

impl Name {
    const MAX_LENGTH: usize = 255;
    const MAX_LABEL_LENGTH: usize = 63;
    const MAX_POINTERS: u32 = 64;

    pub fn root() -> Self {
        Name { labels: Vec::new() }
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Size of this name in wire format: each label plus its length byte plus
    /// a single byte for the root label.
    pub fn size(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    pub fn read_network_bytes<T>(mut buf: T) -> Result<Self, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        let mut labels = Vec::new();
        loop {
            let len = buf.read_u8()?;
            // If the length isn't a length but actually a pointer to a name earlier in
            // the rdata, seek there and read the rest of the name, following any further
            // pointers. Once done, reset the stream to immediately after the pointer.
            if Self::is_offset(len) {
                let offset = Self::get_offset(len, buf.read_u8()?);
                let current = buf.stream_position()?;
                Self::read_offset_into(&mut buf, offset, &mut labels)?;
                buf.seek(SeekFrom::Start(current))?;
                break;
            }

            if Self::read_label_into(&mut buf, len, &mut labels)? {
                break;
            }
        }

        Ok(Name { labels })
    }

    fn read_offset_into<T>(mut buf: T, offset: u64, out: &mut Vec<String>) -> Result<(), ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        buf.seek(SeekFrom::Start(offset))?;
        let mut pointers = 1;

        loop {
            // Only follow a fixed number of pointers to avoid looping forever on
            // rdata where pointers refer to each other.
            if pointers > Self::MAX_POINTERS {
                return Err(ResolverError::bad_response(format!(
                    "reached max number of pointers ({}) while reading name",
                    Self::MAX_POINTERS
                )));
            }

            let len = buf.read_u8()?;
            if Self::is_offset(len) {
                let offset = Self::get_offset(len, buf.read_u8()?);
                buf.seek(SeekFrom::Start(offset))?;
                pointers += 1;
                continue;
            }

            if Self::read_label_into(&mut buf, len, out)? {
                return Ok(());
            }
        }
    }

    /// Read the next name label of length `len` into `out` and return true if the
    /// label was the root label and this name is complete, false otherwise.
    fn read_label_into<T>(buf: T, len: u8, out: &mut Vec<String>) -> Result<bool, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        if len == 0 {
            return Ok(true);
        }

        // Only six bits of the length are used for labels. Anything larger has one of
        // the two reserved bits set that aren't a pointer.
        if usize::from(len) > Self::MAX_LABEL_LENGTH {
            return Err(ResolverError::bad_response(format!(
                "max size for label would be exceeded reading {} bytes",
                len,
            )));
        }

        // Each label takes its length plus a length byte, and the root label needs one more.
        let current = out.iter().map(|l| l.len() + 1).sum::<usize>();
        if current + usize::from(len) + 1 + 1 > Self::MAX_LENGTH {
            return Err(ResolverError::bad_response(format!(
                "max size for name would be exceeded adding {} bytes to {}",
                len, current
            )));
        }

        let mut bytes = Vec::with_capacity(usize::from(len));
        let n = buf.take(u64::from(len)).read_to_end(&mut bytes)?;
        if n != usize::from(len) {
            return Err(ResolverError::bad_response(format!(
                "short read for Name label. expected {} got {}",
                len, n
            )));
        }

        // Unlike TXT strings, labels are not decoded lossily: replacement characters would
        // change the length of the label and the result could no longer be queried or parsed.
        let label = String::from_utf8(bytes).map_err(|e| ResolverError::bad_response_cause("invalid name label", e))?;
        out.push(label);
        Ok(false)
    }

    fn is_offset(len: u8) -> bool {
        len & 0b1100_0000 == 192
    }

    fn get_offset(len: u8, next: u8) -> u64 {
        let pointer = u16::from(len & 0b0011_1111) << 8;
        u64::from(pointer | u16::from(next))
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }

        for label in self.labels.iter() {
            for c in label.chars() {
                if c == '.' || c == '\\' {
                    write!(f, "\\{}", c)?;
                } else {
                    write!(f, "{}", c)?;
                }
            }
            write!(f, ".")?;
        }

        Ok(())
    }
}

impl FromStr for Name {
    type Err = ResolverError;

    /// Parse a name from user input. A trailing dot is optional and a backslash
    /// escapes the character after it so that labels may contain dots.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ResolverError::invalid_query("name must not be empty"));
        }

        if s == "." {
            return Ok(Self::root());
        }

        let mut labels = Vec::new();
        let mut current = String::new();
        let mut chars = s.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => return Err(ResolverError::bad_name(format!("dangling escape at end of name: {}", s))),
                },
                '.' => {
                    if current.is_empty() {
                        return Err(ResolverError::bad_name(format!("name contains an empty label: {}", s)));
                    }
                    labels.push(std::mem::take(&mut current));
                }
                c => current.push(c),
            }
        }

        if !current.is_empty() {
            labels.push(current);
        }

        for label in labels.iter() {
            if label.len() > Self::MAX_LABEL_LENGTH {
                return Err(ResolverError::bad_name(format!(
                    "Name labels are limited to {} bytes max: {}",
                    Self::MAX_LABEL_LENGTH,
                    label
                )));
            }
        }

        let name = Name { labels };
        if name.size() > Self::MAX_LENGTH {
            return Err(ResolverError::bad_name(format!(
                "Names are limited to {} bytes max: {}",
                Self::MAX_LENGTH,
                s
            )));
        }

        Ok(name)
    }
}

#[cfg(test)]
mod test {
    use super::Name;
    use crate::core::ErrorKind;
    use std::io::Cursor;
    use std::str::FromStr;

    #[test]
    fn test_name_from_str_max_length() {
        let parts = vec![
            "a".repeat(Name::MAX_LABEL_LENGTH),
            "b".repeat(Name::MAX_LABEL_LENGTH),
            "c".repeat(Name::MAX_LABEL_LENGTH),
            "d".repeat(Name::MAX_LABEL_LENGTH),
            "com.".to_owned(),
        ];
        let err = Name::from_str(&parts.join(".")).unwrap_err();
        assert_eq!(ErrorKind::BadName, err.kind());
    }

    #[test]
    fn test_name_from_str_error_max_label() {
        let parts = vec!["a".repeat(Name::MAX_LABEL_LENGTH + 1), "com.".to_owned()];
        let err = Name::from_str(&parts.join(".")).unwrap_err();
        assert_eq!(ErrorKind::BadName, err.kind());
    }

    #[test]
    fn test_name_from_str_error_empty() {
        let err = Name::from_str("").unwrap_err();
        assert_eq!(ErrorKind::InvalidQuery, err.kind());
    }

    #[test]
    fn test_name_from_str_error_empty_label() {
        let err = Name::from_str("example..com").unwrap_err();
        assert_eq!(ErrorKind::BadName, err.kind());
    }

    #[test]
    fn test_name_from_str_error_dangling_escape() {
        let err = Name::from_str("example.com\\").unwrap_err();
        assert_eq!(ErrorKind::BadName, err.kind());
    }

    #[test]
    fn test_name_from_str_success_fqdn() {
        let name = Name::from_str("example.com.").unwrap();
        assert!(!name.is_root());
        assert_eq!("example.com.", name.to_string());
    }

    #[test]
    fn test_name_from_str_success_not_fqdn() {
        let name = Name::from_str("example.com").unwrap();
        assert_eq!(vec!["example", "com"], name.labels());
        assert_eq!("example.com.", name.to_string());
    }

    #[test]
    fn test_name_from_str_success_service_instance() {
        let name = Name::from_str("Office Printer._ipp._tcp.local.").unwrap();
        assert_eq!("Office Printer", name.labels()[0]);
        assert_eq!(4, name.labels().len());
    }

    #[test]
    fn test_name_from_str_success_escaped_dot() {
        let name = Name::from_str("a\\.b.example.com").unwrap();
        assert_eq!("a.b", name.labels()[0]);
        assert_eq!("a\\.b.example.com.", name.to_string());
    }

    #[test]
    fn test_name_from_str_success_root_dot() {
        let name = Name::from_str(".").unwrap();
        assert!(name.is_root());
        assert_eq!(".", name.to_string());
    }

    #[test]
    fn test_name_size_root() {
        let name = Name::root();
        assert_eq!(1, name.size());
    }

    #[test]
    fn test_name_size_non_root() {
        let name = Name::from_str("example.com.").unwrap();
        assert_eq!(13, name.size());
    }

    #[rustfmt::skip]
    #[test]
    fn test_name_read_network_bytes_no_pointer() {
        let cur = Cursor::new(vec![
            7,                                // length
            101, 120, 97, 109, 112, 108, 101, // "example"
            3,                                // length
            99, 111, 109,                     // "com"
            0,                                // root
        ]);

        let name = Name::read_network_bytes(cur).unwrap();
        assert_eq!("example.com.", name.to_string());
    }

    #[rustfmt::skip]
    #[test]
    fn test_name_read_network_bytes_single_pointer() {
        let mut cur = Cursor::new(vec![
            7,                                // length
            101, 120, 97, 109, 112, 108, 101, // "example"
            3,                                // length
            99, 111, 109,                     // "com"
            0,                                // root
            3,                                // length
            119, 119, 119,                    // "www"
            192, 0,                           // pointer to offset 0
        ]);

        cur.set_position(13);

        let name = Name::read_network_bytes(&mut cur).unwrap();
        assert_eq!("www.example.com.", name.to_string());
        assert_eq!(19, cur.position());
    }

    #[rustfmt::skip]
    #[test]
    fn test_name_read_network_bytes_multiple_pointer() {
        let mut cur = Cursor::new(vec![
            7,                                // length
            101, 120, 97, 109, 112, 108, 101, // "example"
            3,                                // length
            99, 111, 109,                     // "com"
            0,                                // root
            3,                                // length
            119, 119, 119,                    // "www"
            192, 0,                           // pointer to offset 0
            3,                                // length
            100, 101, 118,                    // "dev"
            192, 13,                          // pointer to offset 13, "www"
        ]);

        cur.set_position(19);

        let name = Name::read_network_bytes(cur).unwrap();
        assert_eq!("dev.www.example.com.", name.to_string());
    }

    #[test]
    fn test_name_read_network_bytes_pointer_loop() {
        let cur = Cursor::new(vec![
            192, 2, // pointer to offset 2
            192, 0, // pointer to offset 0
        ]);

        let err = Name::read_network_bytes(cur).unwrap_err();
        assert_eq!(ErrorKind::BadResponse, err.kind());
    }

    #[rustfmt::skip]
    #[test]
    fn test_name_read_network_bytes_truncated_label() {
        let cur = Cursor::new(vec![
            7,                 // length
            101, 120, 97, 109, // "exam", truncated
        ]);

        let res = Name::read_network_bytes(cur);
        assert!(res.is_err());
    }

    #[test]
    fn test_name_read_network_bytes_missing_root() {
        let cur = Cursor::new(vec![3, 99, 111, 109]);
        let err = Name::read_network_bytes(cur).unwrap_err();
        assert_eq!(ErrorKind::Eof, err.kind());
    }

    #[test]
    fn test_name_read_network_bytes_reserved_bits() {
        let cur = Cursor::new(vec![0b0100_0001, 97, 0]);
        let err = Name::read_network_bytes(cur).unwrap_err();
        assert_eq!(ErrorKind::BadResponse, err.kind());
    }

    #[rustfmt::skip]
    #[test]
    fn test_name_read_network_bytes_label_with_dot() {
        let cur = Cursor::new(vec![
            3,            // length
            97, 46, 98,   // "a.b"
            3,            // length
            99, 111, 109, // "com"
            0,            // root
        ]);

        let name = Name::read_network_bytes(cur).unwrap();
        assert_eq!("a.b", name.labels()[0]);
        assert_eq!("a\\.b.com.", name.to_string());
    }

    #[test]
    fn test_name_read_network_bytes_max_length() {
        // 63 + 63 + 63 + 61 label bytes, four length bytes, and the root is 255 bytes
        let mut bytes = Vec::new();
        for len in [63_usize, 63, 63, 61] {
            bytes.push(len as u8);
            bytes.extend(std::iter::repeat(b'a').take(len));
        }
        bytes.push(0);
        assert_eq!(255, bytes.len());

        let name = Name::read_network_bytes(Cursor::new(bytes)).unwrap();
        assert_eq!(255, name.size());
        assert_eq!(name, Name::from_str(&name.to_string()).unwrap());
    }

    #[test]
    fn test_name_read_network_bytes_exceeds_max_length() {
        // 63 + 63 + 63 + 62 label bytes, four length bytes, and the root is 256 bytes
        let mut bytes = Vec::new();
        for len in [63_usize, 63, 63, 62] {
            bytes.push(len as u8);
            bytes.extend(std::iter::repeat(b'a').take(len));
        }
        bytes.push(0);
        assert_eq!(256, bytes.len());

        let err = Name::read_network_bytes(Cursor::new(bytes)).unwrap_err();
        assert_eq!(ErrorKind::BadResponse, err.kind());
    }

    #[rustfmt::skip]
    #[test]
    fn test_name_read_network_bytes_invalid_utf8_label() {
        let cur = Cursor::new(vec![
            2,            // length
            0xC3, 0x28,   // invalid two byte sequence
            3,            // length
            99, 111, 109, // "com"
            0,            // root
        ]);

        let err = Name::read_network_bytes(cur).unwrap_err();
        assert_eq!(ErrorKind::BadResponse, err.kind());
    }
}
