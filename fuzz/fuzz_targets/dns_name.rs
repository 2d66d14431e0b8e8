#![no_main]

use asyncdns_client::ResolverError;
use asyncdns_client::dns::Name;
use libfuzzer_sys::{Corpus, fuzz_target};
use std::io::Cursor;
use std::str::FromStr;

fuzz_target!(|data: &[u8]| -> Corpus {
    // Try parsing the bytes as a binary DNS name
    let mut cur = Cursor::new(data);
    if let Ok(n) = Name::read_network_bytes(&mut cur) {
        // Anything read from the wire must survive being displayed and parsed again
        let text = n.to_string();
        let parsed = Name::from_str(&text).unwrap();
        assert_eq!(n, parsed);
        return Corpus::Keep;
    }

    // Try parsing the bytes as a text representation of the name
    if let Ok(n) = str::from_utf8(data)
        .map_err(|e| ResolverError::bad_response_cause("utf-8", e))
        .and_then(Name::from_str)
    {
        let _ = n.to_string();
        assert!(n.size() <= 255);
        return Corpus::Keep;
    }

    Corpus::Reject
});
